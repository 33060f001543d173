//! In-process mock PLC for integration tests.
//!
//! Binds `127.0.0.1:0`, accepts any number of connections and answers each
//! request frame with whatever the responder returns. Returning `None` stalls
//! the request so the client runs into its deadline.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Something the mock observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A complete request frame.
    Request(Vec<u8>),
    /// The client closed its end of a connection.
    Closed,
}

type Responder = dyn Fn(&[u8]) -> Option<Vec<u8>> + Send + Sync;

pub struct MockPlc {
    local_addr: SocketAddr,
    accepted: Arc<AtomicUsize>,
    events: Receiver<Event>,
}

impl MockPlc {
    /// Starts a mock that replies with `respond(request)`.
    pub fn start<F>(respond: F) -> Self
    where
        F: Fn(&[u8]) -> Option<Vec<u8>> + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let local_addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let (tx, events) = mpsc::channel();
        let respond: Arc<Responder> = Arc::new(respond);

        let accepted_clone = Arc::clone(&accepted);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                accepted_clone.fetch_add(1, Ordering::SeqCst);
                let tx = tx.clone();
                let respond = Arc::clone(&respond);
                thread::spawn(move || serve(stream, respond, tx));
            }
        });

        Self {
            local_addr,
            accepted,
            events,
        }
    }

    /// Starts a mock that always sends the same reply frame.
    pub fn replying(reply: &str) -> Self {
        let reply = hex::decode(reply).unwrap();
        Self::start(move |_| Some(reply.clone()))
    }

    pub fn address(&self) -> String {
        self.local_addr.to_string()
    }

    /// Number of connections accepted so far.
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    /// Waits for the next event.
    pub fn next_event(&self, timeout: Duration) -> Option<Event> {
        self.events.recv_timeout(timeout).ok()
    }

    /// Waits for the next request frame, skipping close events.
    pub fn next_request(&self, timeout: Duration) -> Option<Vec<u8>> {
        loop {
            match self.next_event(timeout)? {
                Event::Request(frame) => return Some(frame),
                Event::Closed => continue,
            }
        }
    }
}

fn serve(mut stream: TcpStream, respond: Arc<Responder>, tx: Sender<Event>) {
    loop {
        let mut header = [0u8; 4];
        if stream.read_exact(&mut header).is_err() {
            let _ = tx.send(Event::Closed);
            return;
        }
        let length = u16::from_le_bytes([header[2], header[3]]) as usize;
        let mut frame = header.to_vec();
        frame.resize(4 + length, 0);
        if stream.read_exact(&mut frame[4..]).is_err() {
            let _ = tx.send(Event::Closed);
            return;
        }

        let reply = respond(&frame);
        let _ = tx.send(Event::Request(frame));
        if let Some(reply) = reply {
            if stream.write_all(&reply).is_err() {
                let _ = tx.send(Event::Closed);
                return;
            }
        }
    }
}
