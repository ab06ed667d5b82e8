use std::time::Duration;

/// A random delay within one interval, so a freshly started watch loop does
/// not always hit the endpoint at the same phase.
pub fn random_start_offset(interval: Duration) -> Duration {
    let millis = interval.as_millis().max(1);
    Duration::from_millis((rand::random::<u128>() % millis) as u64)
}
