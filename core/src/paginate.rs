/// Split `items` into consecutive pages of at most `page_size` (minimum 1).
pub fn paginate<T>(items: &[T], page_size: usize) -> Vec<&[T]> {
    items.chunks(page_size.max(1)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_page_may_be_short() {
        let items = [1, 2, 3, 4, 5];
        let pages = paginate(&items, 2);
        assert_eq!(pages, vec![&[1, 2][..], &[3, 4][..], &[5][..]]);
    }

    #[test]
    fn empty_and_zero_size() {
        assert!(paginate::<i32>(&[], 3).is_empty());
        assert_eq!(paginate(&[1, 2], 0).len(), 2);
    }
}
