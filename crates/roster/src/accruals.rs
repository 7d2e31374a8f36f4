//! Off-day accrual accounting (`spec.md` §6 `offAccruals`), grounded in the
//! original implementation's `compute_off_accruals` (`app.py`).

use roster_core::{Assignment, ScheduleInput};
use roster_scoring::shared::required_off_days;

use crate::result::OffAccrual;

/// Builds one [`OffAccrual`] entry per employee: `guaranteedOffDays` reuses
/// the same per-employee target the off-balance soft constraint scores
/// against ([`required_off_days`]), so the number reported here is always
/// the number the engine itself tried to hit, not a second, possibly
/// divergent formula. Weekday-only employees carry no target (they are
/// structurally forced onto `O` on non-working days instead) and so report
/// zero guaranteed days.
pub fn compute_off_accruals(input: &ScheduleInput, assignments: &[Assignment]) -> Vec<OffAccrual> {
    let guaranteed = required_off_days(input);

    input
        .employees
        .iter()
        .map(|employee| {
            let actual = assignments
                .iter()
                .filter(|a| a.employee_id == employee.id)
                .filter(|a| roster_core::shift_code::normalize(&a.shift_type) == "O")
                .count() as i64;
            let guaranteed_days = guaranteed.get(&employee.id).copied().unwrap_or(0) as i64;
            OffAccrual {
                employee_id: employee.id.clone(),
                guaranteed_off_days: guaranteed_days,
                actual_off_days: actual,
                extra_off_days: actual - guaranteed_days,
            }
        })
        .collect()
}
