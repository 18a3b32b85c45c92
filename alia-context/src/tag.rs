// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

/// A marker type identifying one slot in a [`crate::Context`]'s extension
/// chain. Define one zero-sized type per subsystem (or per user object-tree
/// adaptor) and implement `Tag` for it; `Data` is usually `RefCell<Inner>`
/// when the tagged subsystem needs interior mutability, or a plain owned
/// value when it doesn't.
///
/// ```
/// use alia_context::Tag;
/// use std::cell::RefCell;
///
/// struct FrameCounterTag;
/// impl Tag for FrameCounterTag {
///     type Data = RefCell<u64>;
///     const NAME: &'static str = "frame_counter";
/// }
/// ```
pub trait Tag: 'static {
    type Data: 'static;

    /// Used only for diagnostics ([`crate::MissingTag`]'s message).
    const NAME: &'static str;
}
