//! Display-layer helpers, kept outside the pipeline core.

/// Pad `items` with clones of `fill` up to `len` entries.
///
/// The home screen shows a fixed grid of report slots (4) and fills the
/// unused ones with placeholders. Lists already at or above `len` are
/// returned unchanged.
pub fn pad_with<T: Clone>(mut items: Vec<T>, len: usize, fill: T) -> Vec<T> {
    while items.len() < len {
        items.push(fill.clone());
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pads_short_list() {
        let padded = pad_with(vec![Some(1)], 4, None);
        assert_eq!(padded, vec![Some(1), None, None, None]);
    }

    #[test]
    fn test_leaves_full_list_alone() {
        let items = vec![1, 2, 3, 4];
        assert_eq!(pad_with(items.clone(), 4, 0), items);
    }

    #[test]
    fn test_does_not_truncate_longer_list() {
        let items = vec![1, 2, 3, 4, 5];
        assert_eq!(pad_with(items.clone(), 4, 0), items);
    }

    #[test]
    fn test_pads_empty_list() {
        assert_eq!(pad_with(Vec::<i32>::new(), 2, 9), vec![9, 9]);
    }
}
