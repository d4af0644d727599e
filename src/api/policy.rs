use chrono::Utc;

use crate::Timestamp;

/// Time policy used for `X-App-Access-Ts` and the matching signature.
///
/// `Local` reads the local clock for every request. `Pinned` always uses the
/// given timestamp, which makes signatures reproducible in tests.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimePolicy {
    #[default]
    Local,
    Pinned(Timestamp),
}

impl TimePolicy {
    pub(crate) fn resolve(self) -> Timestamp {
        match self {
            TimePolicy::Local => Utc::now().timestamp(),
            TimePolicy::Pinned(timestamp) => timestamp,
        }
    }
}
