/// Rounds the given size up to the next multiple of the machine word width.
///
/// Every cursor advance in the arena goes through this macro, so the start
/// of each allocation stays word-aligned. A size of zero stays zero.
///
/// # Examples
///
/// ```rust
/// use rarena::align;
///
/// let word = std::mem::size_of::<usize>();
///
/// assert_eq!(align!(0), 0);
/// assert_eq!(align!(1), word);
/// assert_eq!(align!(word), word);
/// assert_eq!(align!(word + 1), 2 * word);
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + ::core::mem::size_of::<usize>() - 1) & !(::core::mem::size_of::<usize>() - 1)
  };
}

#[cfg(test)]
mod tests {
  use std::mem;

  #[test]
  fn test_zero_stays_zero() {
    assert_eq!(align!(0), 0);
  }

  #[test]
  fn test_word_boundaries() {
    let word = mem::size_of::<usize>();

    for multiple in 1..=8 {
      let exact = word * multiple;

      // An exact multiple is left untouched; everything in the word
      // below it rounds up to it.
      assert_eq!(exact, align!(exact));

      for size in (exact - word + 1)..exact {
        assert_eq!(exact, align!(size));
      }
    }
  }
}
