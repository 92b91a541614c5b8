//! Result hand-off from worker threads to the single consumer thread.
//!
//! Any number of [`ResultSender`] clones may post from any thread; the one
//! [`ResultReceiver`] drains everything currently queued without blocking.
//! Messages from one sender keep their relative order.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use tracing::debug;

use crate::error::Failure;

pub const SUCCESS_TEXT: &str = "Image processed successfully.";

/// Outcome of a job as seen by the consumer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultMessage {
    Success(String),
    Failure(Failure),
    /// Sentinel posted once per job after the terminal outcome; stops the spinner
    Finished,
}

impl ResultMessage {
    /// Tag of the in-process wire shape
    pub fn kind(&self) -> &'static str {
        match self {
            ResultMessage::Success(_) => "success",
            ResultMessage::Failure(_) => "error",
            ResultMessage::Finished => "stop_loading",
        }
    }

    pub fn payload(&self) -> Option<String> {
        match self {
            ResultMessage::Success(text) => Some(text.clone()),
            ResultMessage::Failure(failure) => Some(failure.to_string()),
            ResultMessage::Finished => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ResultMessage::Success(_) | ResultMessage::Failure(_))
    }
}

/// Create an unbounded result channel
pub fn result_channel() -> (ResultSender, ResultReceiver) {
    let (sender, receiver) = mpsc::channel();
    (ResultSender { sender }, ResultReceiver { receiver })
}

#[derive(Debug, Clone)]
pub struct ResultSender {
    sender: Sender<ResultMessage>,
}

impl ResultSender {
    /// Post a message. Never blocks; if the consumer is gone the message is dropped.
    pub fn send(&self, message: ResultMessage) {
        let kind = message.kind();
        if self.sender.send(message).is_err() {
            debug!(kind, "result receiver dropped, discarding message");
        }
    }
}

#[derive(Debug)]
pub struct ResultReceiver {
    receiver: Receiver<ResultMessage>,
}

impl ResultReceiver {
    /// Drain every queued message in FIFO order. Returns an empty vec when
    /// nothing is queued.
    pub fn try_receive_all(&self) -> Vec<ResultMessage> {
        let mut drained = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(message) => drained.push(message),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use std::thread;

    #[test]
    fn drain_is_fifo_and_not_repeated() {
        let (sender, receiver) = result_channel();
        sender.send(ResultMessage::Success(SUCCESS_TEXT.to_string()));
        sender.send(ResultMessage::Finished);

        let drained = receiver.try_receive_all();
        assert_eq!(
            drained,
            vec![
                ResultMessage::Success(SUCCESS_TEXT.to_string()),
                ResultMessage::Finished
            ]
        );
        assert!(receiver.try_receive_all().is_empty());
    }

    #[test]
    fn empty_channel_drains_to_nothing() {
        let (_sender, receiver) = result_channel();
        assert!(receiver.try_receive_all().is_empty());
    }

    #[test]
    fn per_producer_order_is_preserved() {
        let (sender, receiver) = result_channel();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let sender = sender.clone();
                thread::spawn(move || {
                    sender.send(ResultMessage::Success(format!("job {i}")));
                    sender.send(ResultMessage::Finished);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let drained = receiver.try_receive_all();
        assert_eq!(drained.len(), 8);
        for i in 0..4 {
            let text = format!("job {i}");
            let success = drained
                .iter()
                .position(|m| *m == ResultMessage::Success(text.clone()))
                .unwrap();
            // at least one Finished must follow each success
            assert!(drained[success..].contains(&ResultMessage::Finished));
        }
    }

    #[test]
    fn send_after_receiver_dropped_is_silent() {
        let (sender, receiver) = result_channel();
        drop(receiver);
        sender.send(ResultMessage::Finished);
    }

    #[test]
    fn wire_shape() {
        let success = ResultMessage::Success("done".into());
        assert_eq!(success.kind(), "success");
        assert_eq!(success.payload().as_deref(), Some("done"));

        let failure = ResultMessage::Failure(Failure::new(FailureKind::Io, "disk full"));
        assert_eq!(failure.kind(), "error");
        assert_eq!(failure.payload().as_deref(), Some("An error occurred: disk full"));
        assert!(failure.is_terminal());

        assert_eq!(ResultMessage::Finished.kind(), "stop_loading");
        assert_eq!(ResultMessage::Finished.payload(), None);
        assert!(!ResultMessage::Finished.is_terminal());
    }
}
