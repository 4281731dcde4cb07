use std::fmt;
use std::num::NonZeroU32;

/// Driver-side shader object.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ShaderId(pub NonZeroU32);

/// Driver-side program object.
///
/// A value of this type always refers to a program the driver handed out;
/// the GL "program 0" is expressed as `Option::<ProgramId>::None`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramId(pub NonZeroU32);

/// Driver-side vertex buffer object.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BufferId(pub NonZeroU32);

/// Generic vertex attribute index within a linked program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct AttribLocation(pub u32);

/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Buffers affected by a clear.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ClearMask {
    pub color: bool,
    pub depth: bool,
}

impl ClearMask {
    pub const COLOR: Self = Self { color: true, depth: false };
    pub const COLOR_DEPTH: Self = Self { color: true, depth: true };
}

impl Default for ClearMask {
    fn default() -> Self {
        Self::COLOR_DEPTH
    }
}

/// Float vertex attribute layout (`glVertexAttribPointer` with `GL_FLOAT`).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexLayout {
    /// Components per vertex (1..=4).
    pub components: i32,
    pub normalized: bool,
    /// Byte distance between consecutive vertices.
    pub stride: i32,
    /// Byte offset of the first component inside the buffer.
    pub offset: i32,
}

/// Error flag reported by the driver's error query.
///
/// `GL_NO_ERROR` never appears as an `ErrorCode`; it is `None` at the query site.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ErrorCode(pub u32);

impl ErrorCode {
    pub const INVALID_ENUM: Self = Self(0x0500);
    pub const INVALID_VALUE: Self = Self(0x0501);
    pub const INVALID_OPERATION: Self = Self(0x0502);
    pub const OUT_OF_MEMORY: Self = Self(0x0505);
    pub const INVALID_FRAMEBUFFER_OPERATION: Self = Self(0x0506);

    /// Symbolic GL name, if the code is one of the core error flags.
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::INVALID_ENUM => Some("GL_INVALID_ENUM"),
            Self::INVALID_VALUE => Some("GL_INVALID_VALUE"),
            Self::INVALID_OPERATION => Some("GL_INVALID_OPERATION"),
            Self::OUT_OF_MEMORY => Some("GL_OUT_OF_MEMORY"),
            Self::INVALID_FRAMEBUFFER_OPERATION => Some("GL_INVALID_FRAMEBUFFER_OPERATION"),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} (0x{:04X})", self.0),
            None => write!(f, "0x{:04X}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_error_codes_print_their_gl_name() {
        assert_eq!(
            ErrorCode::INVALID_OPERATION.to_string(),
            "GL_INVALID_OPERATION (0x0502)"
        );
    }

    #[test]
    fn unknown_error_codes_print_hex_only() {
        assert_eq!(ErrorCode(0x1234).name(), None);
        assert_eq!(ErrorCode(0x1234).to_string(), "0x1234");
    }

    #[test]
    fn default_clear_mask_covers_color_and_depth() {
        assert_eq!(ClearMask::default(), ClearMask::COLOR_DEPTH);
    }
}
