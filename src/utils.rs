use rand::{Rng, RngCore};

/// The single source of randomness used by the search.
///
/// Every `rand` generator implements it, so a seeded `StdRng` gives
/// reproducible decisions. Tests may provide their own implementation to
/// script the exact sequence of choices.
pub trait RandomSource{
    /// Returns an index drawn uniformly from `0..len`.
    ///
    /// # Panics
    /// May panic if `len` is zero. The search never calls it with an empty range.
    fn pick(&mut self, len: usize) -> usize;
}

impl<R: RngCore> RandomSource for R{
    #[inline]
    fn pick(&mut self, len: usize) -> usize{
        self.random_range(0..len)
    }
}

/// Picks an element of `items` uniformly at random.
///
/// # Returns
/// `None` if `items` is empty.
///
/// # Examples
/// ```rust
/// use rand::{rngs::StdRng, SeedableRng};
/// use othello_mcts::utils::choose;
/// let mut rng = StdRng::seed_from_u64(3);
/// let items = [4, 8, 15];
/// assert!(items.contains(choose(&items, &mut rng).unwrap()));
/// assert!(choose::<u8, _>(&[], &mut rng).is_none());
/// ```
pub fn choose<'a, T, R: RandomSource + ?Sized>(items: &'a [T], rng: &mut R) -> Option<&'a T>{
    if items.is_empty() {
        None
    }
    else{
        items.get(rng.pick(items.len()))
    }
}
