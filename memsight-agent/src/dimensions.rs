//! Host dimensions attached to every metric.

use memsight_common::{Dimension, DimensionSet};
use tracing::debug;

/// Build a dimension set from candidate `(name, value)` pairs.
///
/// Pairs with an empty name or value are dropped. A name that was already
/// taken by an earlier pair is dropped as well.
pub fn build<I, N, V>(pairs: I) -> DimensionSet
where
    I: IntoIterator<Item = (N, V)>,
    N: Into<String>,
    V: Into<String>,
{
    let mut set = DimensionSet::new();

    for (name, value) in pairs {
        let (name, value) = (name.into(), value.into());
        match Dimension::new(name.clone(), value) {
            Some(dimension) => {
                if !set.insert(dimension) {
                    debug!(dimension = %name, "Skipping duplicate dimension");
                }
            }
            None => debug!(dimension = %name, "Skipping empty dimension"),
        }
    }

    set
}
