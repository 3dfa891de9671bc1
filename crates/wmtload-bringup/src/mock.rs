//! Scripted stand-in for a driver node.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::Mutex;
use std::time::Duration;

use wmtload_ioctl::{ControlCommand, ControlDevice, IoctlArg, IoctlResult};

use crate::service::MESSAGE_LEN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CallArg {
    None,
    Int(u64),
    Buffer(Vec<u8>),
}

impl CallArg {
    pub(crate) fn int(&self) -> u64 {
        match self {
            Self::Int(value) => *value,
            other => panic!("expected an integer argument, got {other:?}"),
        }
    }

    pub(crate) fn buffer(&self) -> &[u8] {
        match self {
            Self::Buffer(bytes) => bytes,
            other => panic!("expected a buffer argument, got {other:?}"),
        }
    }
}

#[derive(Default)]
struct State {
    calls: Vec<(u32, CallArg)>,
    queued: HashMap<u32, VecDeque<IoctlResult>>,
    fallback: HashMap<u32, IoctlResult>,
    inbox: VecDeque<Vec<u8>>,
    outbox: Vec<Vec<u8>>,
    hang_up_when_drained: bool,
}

/// Answers each command from a per-command queue, then from a fallback,
/// then with `Ok(0)`. Records every call in order.
#[derive(Default)]
pub(crate) struct MockDevice {
    state: Mutex<State>,
}

impl MockDevice {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Answers used once each, in order, before the fallback applies.
    pub(crate) fn answer(&self, command: ControlCommand, results: &[IoctlResult]) -> &Self {
        self.state
            .lock()
            .unwrap()
            .queued
            .entry(command.code())
            .or_default()
            .extend(results.iter().copied());
        self
    }

    pub(crate) fn always(&self, command: ControlCommand, result: IoctlResult) -> &Self {
        self.state
            .lock()
            .unwrap()
            .fallback
            .insert(command.code(), result);
        self
    }

    /// Queue a request token for the read side.
    pub(crate) fn push_request(&self, token: &[u8]) -> &Self {
        self.state.lock().unwrap().inbox.push_back(token.to_vec());
        self
    }

    /// Report end-of-file once every queued request has been read.
    pub(crate) fn hang_up_when_drained(&self) -> &Self {
        self.state.lock().unwrap().hang_up_when_drained = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<(u32, CallArg)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn codes(&self) -> Vec<u32> {
        self.calls().into_iter().map(|(code, _)| code).collect()
    }

    pub(crate) fn calls_to(&self, command: ControlCommand) -> Vec<CallArg> {
        self.calls()
            .into_iter()
            .filter(|(code, _)| *code == command.code())
            .map(|(_, arg)| arg)
            .collect()
    }

    pub(crate) fn responses(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().outbox.clone()
    }
}

/// A response as it appears on the wire.
pub(crate) fn padded(response: &[u8]) -> Vec<u8> {
    let mut bytes = response.to_vec();
    bytes.resize(MESSAGE_LEN, 0);
    bytes
}

impl ControlDevice for MockDevice {
    fn ioctl(&self, code: u32, arg: IoctlArg<'_>) -> IoctlResult {
        let mut state = self.state.lock().unwrap();
        let recorded = match arg {
            IoctlArg::None => CallArg::None,
            IoctlArg::Int(value) => CallArg::Int(value),
            IoctlArg::Buffer(bytes) => CallArg::Buffer(bytes.to_vec()),
        };
        state.calls.push((code, recorded));

        if let Some(result) = state.queued.get_mut(&code).and_then(VecDeque::pop_front) {
            return result;
        }
        state.fallback.get(&code).copied().unwrap_or(Ok(0))
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        match state.inbox.pop_front() {
            Some(token) => {
                let n = token.len().min(buf.len());
                buf[..n].copy_from_slice(&token[..n]);
                Ok(n)
            }
            None => Ok(0),
        }
    }

    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        self.state.lock().unwrap().outbox.push(buf.to_vec());
        Ok(buf.len())
    }

    fn wait_readable(&self, _timeout: Option<Duration>) -> io::Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(!state.inbox.is_empty() || state.hang_up_when_drained)
    }
}
