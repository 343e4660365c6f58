//! Request tokens for last-request-wins result handling.
//!
//! Every fetch the reducer asks for carries a token. A result is applied only
//! if its token is still the latest one issued for that channel; anything
//! older is a superseded response and must be a no-op.

use serde::{Deserialize, Serialize};

/// Independent streams of requests. A new request on one channel supersedes
/// only earlier requests on the same channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    List,
    Facts,
    Detail,
    Compare,
}

impl Channel {
    pub fn task_key(self) -> &'static str {
        match self {
            Channel::List => "list",
            Channel::Facts => "facts",
            Channel::Detail => "detail",
            Channel::Compare => "compare",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestToken {
    pub channel: Channel,
    pub seq: u64,
}

/// Issues monotonically increasing tokens and remembers the newest per channel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLedger {
    issued: u64,
    list: Option<u64>,
    facts: Option<u64>,
    detail: Option<u64>,
    compare: Option<u64>,
}

impl RequestLedger {
    pub fn issue(&mut self, channel: Channel) -> RequestToken {
        self.issued += 1;
        *self.slot(channel) = Some(self.issued);
        RequestToken {
            channel,
            seq: self.issued,
        }
    }

    /// Forget the in-flight request so its eventual result is ignored.
    pub fn revoke(&mut self, channel: Channel) {
        *self.slot(channel) = None;
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.current(token.channel) == Some(token.seq)
    }

    pub fn is_pending(&self, channel: Channel) -> bool {
        self.current(channel).is_some()
    }

    /// Mark a request as resolved. Returns false for superseded tokens.
    pub fn settle(&mut self, token: RequestToken) -> bool {
        if !self.is_current(token) {
            return false;
        }
        *self.slot(token.channel) = None;
        true
    }

    fn current(&self, channel: Channel) -> Option<u64> {
        match channel {
            Channel::List => self.list,
            Channel::Facts => self.facts,
            Channel::Detail => self.detail,
            Channel::Compare => self.compare,
        }
    }

    fn slot(&mut self, channel: Channel) -> &mut Option<u64> {
        match channel {
            Channel::List => &mut self.list,
            Channel::Facts => &mut self.facts,
            Channel::Detail => &mut self.detail,
            Channel::Compare => &mut self.compare,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_request_supersedes_older() {
        let mut ledger = RequestLedger::default();
        let first = ledger.issue(Channel::List);
        let second = ledger.issue(Channel::List);
        assert!(second.seq > first.seq);
        assert!(!ledger.settle(first));
        assert!(ledger.settle(second));
        assert!(!ledger.is_pending(Channel::List));
    }

    #[test]
    fn channels_are_independent() {
        let mut ledger = RequestLedger::default();
        let list = ledger.issue(Channel::List);
        let detail = ledger.issue(Channel::Detail);
        assert!(ledger.is_current(list));
        assert!(ledger.is_current(detail));
    }

    #[test]
    fn revoked_request_is_ignored() {
        let mut ledger = RequestLedger::default();
        let token = ledger.issue(Channel::Compare);
        ledger.revoke(Channel::Compare);
        assert!(!ledger.settle(token));
    }

    #[test]
    fn settled_token_cannot_apply_twice() {
        let mut ledger = RequestLedger::default();
        let token = ledger.issue(Channel::Facts);
        assert!(ledger.settle(token));
        assert!(!ledger.settle(token));
    }
}
