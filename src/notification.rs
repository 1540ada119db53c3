//! Event Marshaling and Notification Delivery
//!
//! A [`ProfileEvent`] only borrows engine memory, so before it can leave the
//! callback it is copied into a [`NotificationBuffer`]: one heap allocation holding
//! the fixed header followed by the trailing payload. The buffer records where the
//! payload sits inside itself, so it never refers back to the engine.
//!
//! Text payloads are copied as raw bytes up to their NUL; the encoding is only
//! checked when a buffer is read back as text.
//!
//! Marshaling is best effort. An event that cannot be copied (unknown tag, empty
//! header, allocation failure) is dropped and logged, and a buffer the transport
//! refuses is freed on the spot.

use crate::{
    StackId,
    config::floor_char_boundary,
    event::{EventType, PayloadShape, ProfileEvent},
};
use alloc::vec::Vec;
use embassy_sync::{
    blocking_mutex::raw::RawMutex,
    channel::{Channel, TrySendError},
};

/// Location of the trailing payload inside a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PayloadSpan {
    offset: usize,
    len: usize,
}

/// Why an event was not forwarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum DropReason {
    /// The event declared a zero-byte header
    EmptyEvent,
    /// The tag is not one this manager forwards
    UnknownTag(u8),
    /// The buffer could not be allocated
    OutOfMemory,
}

/// A self-contained copy of one profile event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationBuffer {
    event_type: EventType,
    bytes: Vec<u8>,
    header_len: usize,
    payload: Option<PayloadSpan>,
}

/// Bytes up to the first NUL, the way the engine terminates its strings
fn c_text(source: &[u8]) -> &[u8] {
    let end = source.iter().position(|&b| b == 0).unwrap_or(source.len());
    &source[..end]
}

/// At most `capacity` bytes of `text`, never splitting a UTF-8 character
fn truncate_text(text: &[u8], capacity: usize) -> &[u8] {
    match core::str::from_utf8(text) {
        Ok(valid) => floor_char_boundary(valid, capacity).as_bytes(),
        Err(_) => &text[..text.len().min(capacity)],
    }
}

impl NotificationBuffer {
    /// Copy `event` into a single owned allocation
    ///
    /// The allocation is `header + trailing` bytes where the trailing region is:
    /// nothing for fixed events or a missing payload, `capacity + 1` for bounded
    /// text, `len + 1` for exact text, and the byte count for blobs.
    ///
    /// # Errors
    ///
    /// Returns the [`DropReason`] when the event cannot be forwarded.
    pub fn marshal(event: &ProfileEvent<'_>) -> Result<Self, DropReason> {
        if event.header.is_empty() {
            return Err(DropReason::EmptyEvent);
        }
        let event_type = EventType::try_from(event.tag).map_err(DropReason::UnknownTag)?;

        let (content, trailing): (&[u8], Option<usize>) = match (event_type.shape(), event.payload)
        {
            (PayloadShape::Fixed, _) | (_, None) => (&[], None),
            (PayloadShape::BoundedText { capacity }, Some(source)) => {
                (truncate_text(c_text(source), capacity), Some(capacity + 1))
            }
            (PayloadShape::ExactText, Some(source)) => {
                let text = c_text(source);
                (text, Some(text.len() + 1))
            }
            (PayloadShape::Blob, Some(source)) => (source, Some(source.len())),
        };

        let header_len = event.header.len();
        let total = header_len
            .checked_add(trailing.unwrap_or(0))
            .ok_or(DropReason::OutOfMemory)?;

        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(total)
            .map_err(|_| DropReason::OutOfMemory)?;
        bytes.extend_from_slice(event.header);
        bytes.extend_from_slice(content);
        // Terminator and unused bounded capacity
        bytes.resize(total, 0);

        Ok(Self {
            event_type,
            bytes,
            header_len,
            payload: trailing.map(|_| PayloadSpan {
                offset: header_len,
                len: content.len(),
            }),
        })
    }

    /// Event tag
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Copied fixed-size header
    #[must_use]
    pub fn header(&self) -> &[u8] {
        &self.bytes[..self.header_len]
    }

    /// Payload content without terminator or padding, `None` for a null reference
    #[must_use]
    pub fn payload(&self) -> Option<&[u8]> {
        self.payload
            .map(|span| &self.bytes[span.offset..span.offset + span.len])
    }

    /// Payload read back as text, `None` if it is not valid UTF-8
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.payload()
            .and_then(|bytes| core::str::from_utf8(bytes).ok())
    }

    /// Size of the trailing region following the header
    #[must_use]
    pub fn trailing_len(&self) -> usize {
        self.bytes.len() - self.header_len
    }

    /// Whole allocation: header followed by the trailing region
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Total allocation size in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` for a zero-byte buffer, which marshaling never produces
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Transport that takes ownership of completed notification buffers
pub trait NotificationSink {
    /// Publish `buffer`
    ///
    /// # Errors
    ///
    /// Hands the buffer back if the transport cannot accept it.
    fn notify(&mut self, buffer: NotificationBuffer) -> Result<(), NotificationBuffer>;
}

impl<S: NotificationSink + ?Sized> NotificationSink for &mut S {
    fn notify(&mut self, buffer: NotificationBuffer) -> Result<(), NotificationBuffer> {
        (**self).notify(buffer)
    }
}

/// Sink publishing into an `embassy-sync` channel without waiting
pub struct ChannelNotifier<'a, M: RawMutex, const N: usize> {
    channel: &'a Channel<M, NotificationBuffer, N>,
}

impl<'a, M: RawMutex, const N: usize> ChannelNotifier<'a, M, N> {
    /// Publish into `channel`
    #[must_use]
    pub const fn new(channel: &'a Channel<M, NotificationBuffer, N>) -> Self {
        Self { channel }
    }
}

impl<M: RawMutex, const N: usize> NotificationSink for ChannelNotifier<'_, M, N> {
    fn notify(&mut self, buffer: NotificationBuffer) -> Result<(), NotificationBuffer> {
        self.channel
            .try_send(buffer)
            .map_err(|TrySendError::Full(buffer)| buffer)
    }
}

/// Receives engine callbacks and forwards them as notification buffers
pub struct EventMarshaler<S: NotificationSink> {
    sink: S,
    forwarded: u32,
    dropped: u32,
}

impl<S: NotificationSink> EventMarshaler<S> {
    /// Create a marshaler publishing into `sink`
    pub const fn new(sink: S) -> Self {
        Self {
            sink,
            forwarded: 0,
            dropped: 0,
        }
    }

    /// Handle one engine callback
    ///
    /// Never fails: events that cannot be marshaled or delivered are dropped.
    pub fn on_event(&mut self, stack: StackId, event: &ProfileEvent<'_>, callback_parameter: usize) {
        let buffer = match NotificationBuffer::marshal(event) {
            Ok(buffer) => buffer,
            Err(DropReason::EmptyEvent | DropReason::UnknownTag(_)) => {
                // Not an event this manager forwards
                defmt::trace!("[HFRM] ignoring event tag {} on stack {}", event.tag, stack);
                return;
            }
            Err(reason) => {
                defmt::warn!("[HFRM] dropping event tag {}: {}", event.tag, reason);
                self.dropped = self.dropped.wrapping_add(1);
                return;
            }
        };

        let event_type = buffer.event_type();
        match self.sink.notify(buffer) {
            Ok(()) => {
                defmt::trace!(
                    "[HFRM] forwarded {} (param {})",
                    event_type,
                    callback_parameter
                );
                self.forwarded = self.forwarded.wrapping_add(1);
            }
            Err(rejected) => {
                defmt::warn!(
                    "[HFRM] transport rejected {} ({} bytes)",
                    event_type,
                    rejected.len()
                );
                drop(rejected);
                self.dropped = self.dropped.wrapping_add(1);
            }
        }
    }

    /// Number of events handed to the sink
    #[must_use]
    pub const fn forwarded(&self) -> u32 {
        self.forwarded
    }

    /// Number of events lost to allocation failure or transport rejection
    #[must_use]
    pub const fn dropped(&self) -> u32 {
        self.dropped
    }

    /// The notification sink
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the notification sink
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
