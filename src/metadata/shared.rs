//! An endpoint shared between the parties that read it and the single
//! party allowed to record its assigned address.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::common::*;
use super::network_endpoint::NetworkEndpoint;
use super::policy::ValidationPolicy;

/// A cloneable handle to one `NetworkEndpoint`.
///
/// Readers take snapshots and never block each other.  Updates to the
/// assigned address are serialized behind an exclusive lock, so two
/// writers racing to assign different addresses cannot both succeed.
#[derive(Debug, Clone)]
pub struct SharedEndpoint {
    inner: Arc<RwLock<NetworkEndpoint>>,
    policy: Arc<ValidationPolicy>,
}

impl SharedEndpoint {
    /// Share `endpoint`, applying `policy` to later assignments.
    pub fn new(endpoint: NetworkEndpoint, policy: ValidationPolicy) -> SharedEndpoint {
        SharedEndpoint {
            inner: Arc::new(RwLock::new(endpoint)),
            policy: Arc::new(policy),
        }
    }

    // A panic while holding the lock cannot leave the endpoint half
    // updated, since every write is a single field store.
    fn read(&self) -> RwLockReadGuard<'_, NetworkEndpoint> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, NetworkEndpoint> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the endpoint as it is right now.
    pub fn snapshot(&self) -> NetworkEndpoint {
        self.read().clone()
    }

    /// The address currently in effect, if any.
    pub fn assigned(&self) -> Option<IpAddr> {
        self.read().assigned()
    }

    /// The policy applied to assignments.
    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Record the assigned address under the handle's policy.  See
    /// `NetworkEndpoint::assign_with_policy`.
    pub fn assign(&self, ip: IpAddr) -> Result<bool> {
        self.write().assign_with_policy(ip, &self.policy)
    }

    /// Replace the assigned address only if it is still `expected`.  This
    /// lets a writer that has observed the current value move it forward
    /// regardless of the reassignment policy, while a stale writer gets an
    /// `InvalidState` error.
    pub fn compare_and_assign(&self, expected: Option<IpAddr>, ip: IpAddr) -> Result<bool> {
        let mut endpoint = self.write();
        let current = endpoint.assigned();
        if current != expected {
            return Err(Error::invalid_state(format!(
                "'{}' has address {:?}, expected {:?}",
                endpoint.name(),
                current,
                expected
            )));
        }
        if current == Some(ip) {
            return Ok(false);
        }
        debug!("'{}' address {:?} -> {}", endpoint.name(), current, ip);
        endpoint.replace_assigned(ip);
        Ok(true)
    }
}

#[cfg(test)]
mod test {
    use std::thread;

    use super::*;
    use crate::metadata::network_endpoint::sample_endpoint;

    fn ip(s: &str) -> IpAddr {
        IpAddr::from_str(s).unwrap()
    }

    #[test]
    fn clones_see_the_same_assignment() {
        let shared = SharedEndpoint::new(sample_endpoint(), ValidationPolicy::default());
        let reader = shared.clone();
        assert_eq!(reader.assigned(), None);
        assert!(shared.assign(ip("10.0.0.50")).unwrap());
        assert_eq!(reader.assigned(), Some(ip("10.0.0.50")));
        assert_eq!(reader.snapshot().assigned(), Some(ip("10.0.0.50")));
    }

    #[test]
    fn only_one_racing_writer_wins() {
        let shared = SharedEndpoint::new(sample_endpoint(), ValidationPolicy::default());
        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || shared.assign(ip(&format!("10.0.0.{}", 100 + i))))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        for result in &results {
            if let Err(err) = result {
                assert!(err.is_invalid_state());
            }
        }
        assert!(shared.assigned().is_some());
    }

    #[test]
    fn compare_and_assign_rejects_stale_writers() {
        let shared = SharedEndpoint::new(sample_endpoint(), ValidationPolicy::default());
        assert!(shared.compare_and_assign(None, ip("10.0.0.50")).unwrap());
        assert!(shared
            .compare_and_assign(None, ip("10.0.0.51"))
            .unwrap_err()
            .is_invalid_state());
        assert!(shared
            .compare_and_assign(Some(ip("10.0.0.50")), ip("10.0.0.51"))
            .unwrap());
        assert!(!shared
            .compare_and_assign(Some(ip("10.0.0.51")), ip("10.0.0.51"))
            .unwrap());
        assert_eq!(shared.assigned(), Some(ip("10.0.0.51")));
    }

    #[test]
    fn snapshots_are_independent_of_later_writes() {
        let shared = SharedEndpoint::new(sample_endpoint(), ValidationPolicy::default());
        let before = shared.snapshot();
        shared.assign(ip("10.0.0.50")).unwrap();
        assert_eq!(before.assigned(), None);
        assert_eq!(before, sample_endpoint());
    }
}
