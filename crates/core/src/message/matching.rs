// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::Message;

/// A predicate over messages that also narrows them.
///
/// Implemented by every payload type (narrowing to the payload) and by the
/// family markers such as [`VcsMessage`](super::VcsMessage) (narrowing to
/// the message itself).
pub trait Matches {
    type Target: ?Sized;

    fn narrow(message: &Message) -> Option<&Self::Target>;

    fn is(message: &Message) -> bool {
        Self::narrow(message).is_some()
    }
}

/// Start a non-exclusive dispatch over `message`.
///
/// Every `on` whose predicate holds runs its handler, in call order:
///
/// ```ignore
/// dispatch(&msg)
///     .on::<VcsMessage>(|m| log(m))
///     .on::<VcsCloneEndNotification>(|end| record(&end.path));
/// ```
pub fn dispatch(message: &Message) -> Match<'_> {
    Match { message }
}

pub struct Match<'a> {
    message: &'a Message,
}

impl<'a> Match<'a> {
    pub fn on<M: Matches>(&self, handler: impl FnOnce(&'a M::Target)) -> &Self
    where
        M::Target: 'a,
    {
        if let Some(target) = M::narrow(self.message) {
            handler(target);
        }
        self
    }

    pub fn message(&self) -> &'a Message {
        self.message
    }
}
