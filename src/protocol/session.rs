//! # Command Transactions
//!
//! Every exchange with the instrument has the same shape:
//!
//! ```text
//! host  ── "QG129\r" ──────────────────────────────►  instrument
//! host  ◄──────────────────────────────── "0\r" ──  ack line
//! host  ◄────────────────── "3907," data… checksum ──  payload (ack 0 only)
//! ```
//!
//! One write, one ack read, and at most one payload read. Nothing is kept
//! between transactions, and nothing is retried: a channel error ends the
//! session, while a non-zero ack or a bad checksum does not.

use crate::error::ScopeshotError;
use crate::instrument::InstrumentConfig;
use crate::transport::ByteChannel;

use super::commands::{self, Ack};
use super::link::{Block, Link};

/// The outcome of one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply<T> {
    pub ack: Ack,
    /// The acknowledgement line as sent. For a non-zero ack this is the
    /// whole answer.
    pub ack_text: String,
    /// Present only when `ack` is [`Ack::Success`].
    pub payload: Option<T>,
}

impl<T> Reply<T> {
    fn without_payload(ack: Ack, ack_text: String) -> Self {
        Self {
            ack,
            ack_text,
            payload: None,
        }
    }
}

/// The instrument status word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// Status line as received
    pub raw: String,
    /// Decoded value (0 when the line holds no number)
    pub value: u32,
}

impl Status {
    /// Parse a decimal status line.
    ///
    /// Leading whitespace and trailing garbage are tolerated; only the
    /// leading run of digits counts.
    pub fn parse(raw: &str) -> Self {
        let digits: String = raw
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();

        let value = match digits.parse() {
            Ok(value) => value,
            Err(_) => {
                log::warn!("Status word {:?} is not a number, using 0", raw);
                0
            }
        };

        Self {
            raw: raw.to_string(),
            value,
        }
    }
}

/// # ScopeMeter Session
///
/// ## Example
///
/// ```
/// use scopeshot::instrument::InstrumentConfig;
/// use scopeshot::protocol::ScopeMeter;
/// use scopeshot::transport::MockChannel;
///
/// let channel = MockChannel::new(b"0\rFLUKE 99; V01.10; 93-11-05\r");
/// let mut scope = ScopeMeter::new(channel, &InstrumentConfig::SCOPEMETER_99);
///
/// let reply = scope.identify()?;
/// assert!(reply.ack.is_success());
/// assert_eq!(reply.payload.as_deref(), Some("FLUKE 99; V01.10; 93-11-05"));
/// # Ok::<(), scopeshot::error::ScopeshotError>(())
/// ```
pub struct ScopeMeter<C> {
    link: Link<C>,
    max_payload: usize,
}

impl<C: ByteChannel> ScopeMeter<C> {
    pub fn new(channel: C, config: &InstrumentConfig) -> Self {
        Self {
            link: Link::new(channel, config),
            max_payload: config.max_payload,
        }
    }

    /// Send `ID` and read the identification string.
    pub fn identify(&mut self) -> Result<Reply<String>, ScopeshotError> {
        self.text_query(&commands::identify())
    }

    /// Send `IS` and read the status word.
    pub fn instrument_status(&mut self) -> Result<Reply<Status>, ScopeshotError> {
        let (ack, ack_text) = self.transact(&commands::instrument_status())?;
        if !ack.is_success() {
            return Ok(Reply::without_payload(ack, ack_text));
        }

        let line = self.link.read_line()?;
        let status = Status::parse(&String::from_utf8_lossy(&line));
        log::info!("IS: status = '{}' 0x{:04x}", status.raw, status.value);

        Ok(Reply {
            ack,
            ack_text,
            payload: Some(status),
        })
    }

    /// Send any command whose answer is a single CR-terminated line.
    ///
    /// ```
    /// use scopeshot::instrument::InstrumentConfig;
    /// use scopeshot::protocol::ScopeMeter;
    /// use scopeshot::transport::MockChannel;
    ///
    /// let mut scope = ScopeMeter::new(MockChannel::new(b"1\r"), &InstrumentConfig::default());
    /// let reply = scope.query("CV")?;
    /// assert_eq!(reply.ack_text, "1");
    /// assert_eq!(reply.payload, None);
    /// # Ok::<(), scopeshot::error::ScopeshotError>(())
    /// ```
    pub fn query(&mut self, mnemonic: &str) -> Result<Reply<String>, ScopeshotError> {
        self.text_query(&commands::command(mnemonic))
    }

    /// Send `QG<mode>` and read the checksummed graphics block.
    ///
    /// The block is returned even if its checksum does not match.
    ///
    /// ## Errors
    ///
    /// [`ScopeshotError::InvalidLength`] if the byte count is not a decimal
    /// number or exceeds the configured `max_payload`.
    pub fn query_graphics(&mut self, mode: u32) -> Result<Reply<Block>, ScopeshotError> {
        let (ack, ack_text) = self.transact(&commands::query_graphics(mode))?;
        if !ack.is_success() {
            return Ok(Reply::without_payload(ack, ack_text));
        }

        let field = self.link.read_field()?;
        let len = self.parse_length(&field)?;
        log::info!("QG{}: receiving {} bytes", mode, len);

        let block = self.link.read_block(len)?;

        Ok(Reply {
            ack,
            ack_text,
            payload: Some(block),
        })
    }

    pub fn link(&self) -> &Link<C> {
        &self.link
    }

    pub fn into_inner(self) -> C {
        self.link.into_inner()
    }

    fn text_query(&mut self, cmd: &[u8]) -> Result<Reply<String>, ScopeshotError> {
        let (ack, ack_text) = self.transact(cmd)?;
        if !ack.is_success() {
            return Ok(Reply::without_payload(ack, ack_text));
        }

        let line = self.link.read_line()?;
        let text = String::from_utf8_lossy(&line).into_owned();

        Ok(Reply {
            ack,
            ack_text,
            payload: Some(text),
        })
    }

    /// Send a command and read its acknowledgement line.
    fn transact(&mut self, cmd: &[u8]) -> Result<(Ack, String), ScopeshotError> {
        self.link.send(cmd)?;

        let token = self.link.read_line()?;
        let ack = Ack::from_token(&token);
        let ack_text = String::from_utf8_lossy(&token).into_owned();

        if !ack.is_success() {
            log::warn!(
                "{}: {} ({:?})",
                String::from_utf8_lossy(cmd).trim_end(),
                ack,
                ack_text
            );
        }

        Ok((ack, ack_text))
    }

    fn parse_length(&self, field: &[u8]) -> Result<usize, ScopeshotError> {
        let text = String::from_utf8_lossy(field);
        let trimmed = text.trim();

        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ScopeshotError::InvalidLength(format!(
                "{:?} is not a byte count",
                text
            )));
        }

        let len: usize = trimmed.parse().map_err(|_| {
            ScopeshotError::InvalidLength(format!("{:?} is out of range", text))
        })?;

        if len > self.max_payload {
            return Err(ScopeshotError::InvalidLength(format!(
                "{} bytes exceeds the {} byte limit",
                len, self.max_payload
            )));
        }

        Ok(len)
    }
}

// ============================================================================
// TESTS
// ============================================================================
