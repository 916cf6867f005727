// Normalization helpers shared by the collector and consumers

use crate::model::{NativeTag, NativeTagDict};

/// Group native tag values by id, keeping arrival order within each id
pub fn group_by_id(tags: &[NativeTag]) -> NativeTagDict {
    let mut dict = NativeTagDict::default();
    for tag in tags {
        dict.append(&tag.id, tag.value.clone());
    }
    dict
}

/// Join artist names for display: `"A"`, `"A & B"`, `"A, B & C"`
pub fn join_artists<S: AsRef<str>>(artists: &[S]) -> String {
    match artists {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(|a| a.as_ref()).collect();
            format!("{} & {}", head.join(", "), last.as_ref())
        }
    }
}

/// Convert a normalized rating to 1..=5 stars, 0 when unrated.
///
/// Rounds half away from zero (`f64::round`). Input is expected in `[0, 1]`
/// and is not clamped.
pub fn rating_to_stars(rating: Option<f64>) -> u8 {
    match rating {
        None => 0,
        Some(r) => 1u8.saturating_add((r * 4.0).round() as u8),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TagValue;

    #[test]
    fn test_join_artists() {
        let none: [&str; 0] = [];
        assert_eq!(join_artists(&none), "");
        assert_eq!(join_artists(&["A"]), "A");
        assert_eq!(join_artists(&["A", "B"]), "A & B");
        assert_eq!(join_artists(&["A", "B", "C"]), "A, B & C");
        assert_eq!(join_artists(&["A", "B", "C", "D"]), "A, B, C & D");
    }

    #[test]
    fn test_rating_to_stars() {
        assert_eq!(rating_to_stars(None), 0);
        assert_eq!(rating_to_stars(Some(0.0)), 1);
        assert_eq!(rating_to_stars(Some(1.0)), 5);
        assert_eq!(rating_to_stars(Some(0.5)), 3);
        // 0.125 * 4 = 0.5 rounds up
        assert_eq!(rating_to_stars(Some(0.125)), 2);
    }

    #[test]
    fn test_group_by_id_empty() {
        assert!(group_by_id(&[]).is_empty());
    }

    #[test]
    fn test_group_by_id_keeps_first_appearance_order() {
        let tags = vec![
            NativeTag::new("ARTIST", "A"),
            NativeTag::new("TITLE", "T"),
            NativeTag::new("ARTIST", "B"),
        ];
        let dict = group_by_id(&tags);
        let ids: Vec<_> = dict.ids().collect();
        assert_eq!(ids, vec!["ARTIST", "TITLE"]);
        assert_eq!(
            dict.get("ARTIST").unwrap(),
            &[TagValue::from("A"), TagValue::from("B")]
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::model::TagValue;
    use proptest::prelude::*;

    fn native_tags() -> impl Strategy<Value = Vec<NativeTag>> {
        prop::collection::vec(("[a-d]", any::<i64>()), 0..40).prop_map(|pairs| {
            pairs
                .into_iter()
                .map(|(id, n)| NativeTag::new(id, TagValue::Integer(n)))
                .collect()
        })
    }

    proptest! {
        /// Every value lands under its id exactly once, in original relative order
        #[test]
        fn group_by_id_preserves_values(tags in native_tags()) {
            let dict = group_by_id(&tags);
            let total: usize = dict.iter().map(|(_, values)| values.len()).sum();
            prop_assert_eq!(total, tags.len());
            for (id, values) in dict.iter() {
                let expected: Vec<TagValue> = tags
                    .iter()
                    .filter(|t| t.id == id)
                    .map(|t| t.value.clone())
                    .collect();
                prop_assert_eq!(values, expected.as_slice());
            }
        }
    }
}
