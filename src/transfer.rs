//! The "attached to an active transfer" capability.
//!
//! Whether a COPY transfer is running is decided by the protocol session that
//! owns the connection, not by the serializer. The session hands the
//! serializer a [`TransferState`] to query; while it reports an active
//! transfer, the serializer refuses configuration changes.
//!
//! ```rust
//! use copy_text::{CopyOptions, CopySerializer};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let in_progress = Rc::new(Cell::new(true));
//! let flag = Rc::clone(&in_progress);
//!
//! let mut ser = CopySerializer::new(Vec::<u8>::new(), 1, CopyOptions::new()).unwrap();
//! ser.attach(move || flag.get());
//! assert!(ser.set_delimiter(",").is_err());
//!
//! in_progress.set(false);
//! assert!(ser.set_delimiter(",").is_ok());
//! ```

/// Reports whether the owning session is in the middle of a COPY transfer.
pub trait TransferState {
    fn is_active(&self) -> bool;
}

impl<F> TransferState for F
where
    F: Fn() -> bool,
{
    fn is_active(&self) -> bool {
        self()
    }
}

/// A serializer not bound to any session; never active.
#[derive(Clone, Copy, Debug, Default)]
pub struct Detached;

impl TransferState for Detached {
    fn is_active(&self) -> bool {
        false
    }
}
