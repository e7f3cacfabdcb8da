//! Human-readable course labels.

/// Label for the number of course days left, as shown in the medication list.
///
/// Uses Russian plural forms: `остался 1 день`, `осталось 3 дня`,
/// `осталось 5 дней`. Zero or negative means the course is over.
pub fn remaining_label(days_left: i64) -> String {
    if days_left <= 0 {
        return "курс завершен".to_string();
    }

    let last_two = days_left % 100;
    let last = days_left % 10;

    if last == 1 && last_two != 11 {
        format!("остался {} день", days_left)
    } else if (2..=4).contains(&last) && !(12..=14).contains(&last_two) {
        format!("осталось {} дня", days_left)
    } else {
        format!("осталось {} дней", days_left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_forms() {
        assert_eq!(remaining_label(1), "остался 1 день");
        assert_eq!(remaining_label(2), "осталось 2 дня");
        assert_eq!(remaining_label(4), "осталось 4 дня");
        assert_eq!(remaining_label(5), "осталось 5 дней");
        assert_eq!(remaining_label(11), "осталось 11 дней");
        assert_eq!(remaining_label(12), "осталось 12 дней");
        assert_eq!(remaining_label(21), "остался 21 день");
        assert_eq!(remaining_label(23), "осталось 23 дня");
        assert_eq!(remaining_label(111), "осталось 111 дней");
    }

    #[test]
    fn test_finished() {
        assert_eq!(remaining_label(0), "курс завершен");
        assert_eq!(remaining_label(-3), "курс завершен");
    }
}
