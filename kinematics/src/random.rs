use rand::Rng;

/// Draws a uniform double in [0, 1).
///
/// This is the only randomness primitive the generator uses, so that the
/// event stream depends on nothing but the order and number of calls.
#[inline]
pub fn flat<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random::<f64>()
}
