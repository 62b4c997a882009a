#![forbid(unsafe_code)]

//! Command transport to the key-value store.
//!
//! The graph layer only needs "send a command, get the reply frame back".
//! [`RedisTransport`] does that over one synchronous connection; the
//! [`ScriptedTransport`] answers from a closure and is meant for tests.

use std::sync::Arc;

use parking_lot::Mutex;
use redis::Value as Frame;
use tracing::{debug, trace};

use crate::config::ClientConfig;
use crate::types::Result;

/// Sends one command and returns its reply.
pub trait Transport: Send + Sync {
    /// Executes `command` with `args`.
    fn execute(&self, command: &str, args: &[&str]) -> Result<Frame>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, command: &str, args: &[&str]) -> Result<Frame> {
        (**self).execute(command, args)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, command: &str, args: &[&str]) -> Result<Frame> {
        (**self).execute(command, args)
    }
}

/// Single-connection transport. Commands are serialized by the connection lock.
pub struct RedisTransport {
    conn: Mutex<redis::Connection>,
}

impl RedisTransport {
    /// Opens a connection using the URL and timeouts from `config`.
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let conn = match config.connect_timeout() {
            Some(timeout) => client.get_connection_with_timeout(timeout)?,
            None => client.get_connection()?,
        };
        conn.set_read_timeout(config.read_timeout())?;
        debug!(
            connect_timeout_ms = config.connect_timeout_ms,
            read_timeout_ms = config.read_timeout_ms,
            "transport.connect"
        );
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl Transport for RedisTransport {
    fn execute(&self, command: &str, args: &[&str]) -> Result<Frame> {
        let mut cmd = redis::cmd(command);
        for arg in args {
            cmd.arg(*arg);
        }
        trace!(command, args = args.len(), "transport.execute");
        let mut conn = self.conn.lock();
        Ok(cmd.query::<Frame>(&mut *conn)?)
    }
}

type Handler = dyn Fn(&str, &[String]) -> Result<Frame> + Send + Sync;

/// Transport that answers from a closure and records every command.
pub struct ScriptedTransport {
    handler: Box<Handler>,
    log: Mutex<Vec<Vec<String>>>,
}

impl ScriptedTransport {
    /// Builds a transport around `handler`, called with the command name and its arguments.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&str, &[String]) -> Result<Frame> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Every command executed so far, as `[command, args...]`.
    pub fn commands(&self) -> Vec<Vec<String>> {
        self.log.lock().clone()
    }

    /// Number of executed commands whose arguments contain `needle`.
    pub fn count_matching(&self, needle: &str) -> usize {
        self.log
            .lock()
            .iter()
            .filter(|entry| entry.iter().skip(1).any(|arg| arg.contains(needle)))
            .count()
    }

    /// Last argument list that contained `needle`.
    pub fn last_matching(&self, needle: &str) -> Option<Vec<String>> {
        self.log
            .lock()
            .iter()
            .rev()
            .find(|entry| entry.iter().skip(1).any(|arg| arg.contains(needle)))
            .cloned()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, command: &str, args: &[&str]) -> Result<Frame> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let mut entry = Vec::with_capacity(args.len() + 1);
        entry.push(command.to_owned());
        entry.extend(args.iter().cloned());
        self.log.lock().push(entry);
        (self.handler)(command, &args)
    }
}
