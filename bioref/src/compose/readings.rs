//! Enumeration of alternative readings for roles with too many fillers.

use bioref_core::Argument;

/// Every combination that picks one filler per violating role, with the
/// other arguments held fixed.
///
/// Argument order follows `arguments`. Combinations are produced with the
/// first violating role varying slowest. At most `limit` readings are
/// returned, and never fewer than one; a truncated enumeration is logged.
#[must_use]
pub fn enumerate(arguments: &[Argument], violating: &[String], limit: usize) -> Vec<Vec<Argument>> {
    let limit = limit.max(1);
    let choices: Vec<Vec<&Argument>> = violating
        .iter()
        .map(|role| {
            let mut fillers: Vec<&Argument> = Vec::new();
            for arg in arguments.iter().filter(|a| &a.role == role) {
                if !fillers.iter().any(|f| f.item == arg.item) {
                    fillers.push(arg);
                }
            }
            fillers
        })
        .collect();
    if choices.is_empty() || choices.iter().any(Vec::is_empty) {
        return vec![arguments.to_vec()];
    }

    let total = choices
        .iter()
        .map(Vec::len)
        .try_fold(1usize, |acc, n| acc.checked_mul(n))
        .unwrap_or(usize::MAX);
    if total > limit {
        log::warn!("{total} readings for roles {violating:?}, keeping the first {limit}");
    }

    let mut readings = Vec::with_capacity(total.min(limit));
    let mut index = vec![0usize; choices.len()];
    while readings.len() < limit {
        let reading = arguments
            .iter()
            .filter(|arg| match violating.iter().position(|r| *r == arg.role) {
                Some(slot) => std::ptr::eq(*arg, choices[slot][index[slot]]),
                None => true,
            })
            .cloned()
            .collect();
        readings.push(reading);

        // odometer step, last slot fastest
        let mut slot = choices.len();
        loop {
            if slot == 0 {
                return readings;
            }
            slot -= 1;
            index[slot] += 1;
            if index[slot] < choices[slot].len() {
                break;
            }
            index[slot] = 0;
        }
    }
    readings
}

#[cfg(test)]
mod tests {
    use super::*;
    use bioref_core::ItemId;

    fn arg(role: &str, id: u32) -> Argument {
        Argument::new(role, ItemId(id))
    }

    #[test]
    fn test_single_violation() {
        let args = vec![arg("SUBJ", 1), arg("SUBJ", 2), arg("OBJ", 3)];
        let readings = enumerate(&args, &["SUBJ".to_string()], 64);
        assert_eq!(
            readings,
            vec![
                vec![arg("SUBJ", 1), arg("OBJ", 3)],
                vec![arg("SUBJ", 2), arg("OBJ", 3)],
            ]
        );
    }

    #[test]
    fn test_cartesian_product_and_bound() {
        let args = vec![
            arg("SUBJ", 1),
            arg("SUBJ", 2),
            arg("OBJ", 3),
            arg("OBJ", 4),
            arg("OBJ", 5),
        ];
        let roles = ["SUBJ".to_string(), "OBJ".to_string()];
        let all = enumerate(&args, &roles, 64);
        assert_eq!(all.len(), 6);
        assert_eq!(all[0], vec![arg("SUBJ", 1), arg("OBJ", 3)]);
        assert_eq!(all[5], vec![arg("SUBJ", 2), arg("OBJ", 5)]);
        assert_eq!(enumerate(&args, &roles, 4).len(), 4);
    }

    #[test]
    fn test_zero_bound_keeps_first_reading() {
        let args = vec![arg("SUBJ", 1), arg("SUBJ", 2), arg("OBJ", 3)];
        let readings = enumerate(&args, &["SUBJ".to_string()], 0);
        assert_eq!(readings, vec![vec![arg("SUBJ", 1), arg("OBJ", 3)]]);
    }

    #[test]
    fn test_duplicate_fillers_collapse() {
        let args = vec![arg("SUBJ", 1), arg("SUBJ", 1), arg("SUBJ", 2)];
        let readings = enumerate(&args, &["SUBJ".to_string()], 64);
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0], vec![arg("SUBJ", 1)]);
    }
}
