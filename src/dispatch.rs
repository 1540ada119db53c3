//! Notification Dispatch
//!
//! Consumer side of a [`ChannelNotifier`](crate::ChannelNotifier): an async loop
//! that takes marshaled events off the channel and hands them to the application.
//!
//! The loop waits on two sources at once with `embassy_futures::select`:
//!
//! - the notification channel, delivering each buffer to the listener
//! - a shutdown `Signal`, ending the loop
//!
//! Queued buffers win over a pending shutdown, so everything published before the
//! signal was raised is still delivered.

use crate::notification::NotificationBuffer;
use embassy_futures::select::{Either, select};
use embassy_sync::{blocking_mutex::raw::RawMutex, channel::Channel, signal::Signal};

/// Application side receiving profile events
pub trait NotificationListener {
    /// Handle one event; the buffer is freed when this returns
    fn on_notification(&mut self, buffer: NotificationBuffer);
}

impl<F: FnMut(NotificationBuffer)> NotificationListener for F {
    fn on_notification(&mut self, buffer: NotificationBuffer) {
        self(buffer);
    }
}

/// Deliver notifications from `channel` to `listener` until `shutdown` is signaled
///
/// Returns the number of notifications delivered.
pub async fn dispatch_notifications<M: RawMutex, const N: usize, L: NotificationListener>(
    channel: &Channel<M, NotificationBuffer, N>,
    shutdown: &Signal<M, ()>,
    listener: &mut L,
) -> usize {
    let mut delivered = 0;
    loop {
        match select(channel.receive(), shutdown.wait()).await {
            Either::First(buffer) => {
                defmt::trace!("[HFRM] dispatching {}", buffer.event_type());
                listener.on_notification(buffer);
                delivered += 1;
            }
            Either::Second(()) => {
                defmt::debug!("[HFRM] dispatcher stopped after {} event(s)", delivered);
                return delivered;
            }
        }
    }
}
