// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Something that can describe itself for structured logging.
pub trait TracedEffect {
    /// Short snake_case label used as the `effect` field.
    fn name(&self) -> &'static str;

    /// Key/value pairs worth attaching to the log line.
    fn fields(&self) -> Vec<(&'static str, String)>;
}
