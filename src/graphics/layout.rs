//! Describes how the bytes of a vertex buffer are split into attributes.

use gl::types::GLenum;

/// Component type of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Float,
    UnsignedInt,
    UnsignedByte,
}

impl ElementKind {
    pub fn gl_enum(self) -> GLenum {
        match self {
            ElementKind::Float => gl::FLOAT,
            ElementKind::UnsignedInt => gl::UNSIGNED_INT,
            ElementKind::UnsignedByte => gl::UNSIGNED_BYTE,
        }
    }

    pub fn size(self) -> usize {
        match self {
            ElementKind::Float | ElementKind::UnsignedInt => 4,
            ElementKind::UnsignedByte => 1,
        }
    }
}

/// Rust types that can be pushed onto a layout.
pub trait LayoutElement {
    const KIND: ElementKind;
    const NORMALIZED: bool;
}

impl LayoutElement for f32 {
    const KIND: ElementKind = ElementKind::Float;
    const NORMALIZED: bool = false;
}

impl LayoutElement for u32 {
    const KIND: ElementKind = ElementKind::UnsignedInt;
    const NORMALIZED: bool = false;
}

/// Bytes are normalized to `0.0..=1.0`, which is what you want for packed colors.
impl LayoutElement for u8 {
    const KIND: ElementKind = ElementKind::UnsignedByte;
    const NORMALIZED: bool = true;
}

/// One attribute: `count` components of `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexBufferElement {
    pub count: u32,
    pub kind: ElementKind,
    pub normalized: bool,
}

impl VertexBufferElement {
    /// Size of the whole attribute in bytes.
    pub fn size(&self) -> usize {
        self.count as usize * self.kind.size()
    }
}

/// An element placed at its attribute index and byte offset within a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub index: u32,
    pub offset: usize,
    pub element: VertexBufferElement,
}

/// Ordered list of attributes making up one vertex. Nothing checks that it matches the buffer it
/// is used with.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VertexBufferLayout {
    elements: Vec<VertexBufferElement>,
    stride: usize,
}

impl VertexBufferLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an attribute of `count` components of type `T`.
    pub fn push<T: LayoutElement>(&mut self, count: u32) -> &mut Self {
        let element = VertexBufferElement {
            count,
            kind: T::KIND,
            normalized: T::NORMALIZED,
        };
        self.stride += element.size();
        self.elements.push(element);
        self
    }

    /// Builder form of [`push`](Self::push).
    pub fn with<T: LayoutElement>(mut self, count: u32) -> Self {
        self.push::<T>(count);
        self
    }

    pub fn elements(&self) -> &[VertexBufferElement] { &self.elements }

    /// Size of one vertex in bytes.
    pub fn stride(&self) -> usize { self.stride }

    /// Elements paired with their attribute index and byte offset.
    pub fn attributes(&self) -> impl Iterator<Item = VertexAttribute> + '_ {
        self.elements
            .iter()
            .scan(0usize, |offset, element| {
                let start = *offset;
                *offset += element.size();
                Some((start, *element))
            })
            .enumerate()
            .map(|(index, (offset, element))| VertexAttribute {
                index: index as u32,
                offset,
                element,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_layout_has_no_stride() {
        let layout = VertexBufferLayout::new();
        assert!(layout.elements().is_empty());
        assert_eq!(layout.stride(), 0);
        assert_eq!(layout.attributes().count(), 0);
    }

    #[test]
    fn stride_accumulates_element_sizes() {
        let layout = VertexBufferLayout::new()
            .with::<f32>(2)
            .with::<f32>(2)
            .with::<u8>(4)
            .with::<u32>(1);

        assert_eq!(layout.stride(), 8 + 8 + 4 + 4);
    }

    #[test]
    fn push_records_kind_and_normalization() {
        let mut layout = VertexBufferLayout::new();
        layout.push::<f32>(3).push::<u8>(4);

        assert_eq!(
            layout.elements(),
            &[
                VertexBufferElement { count: 3, kind: ElementKind::Float, normalized: false },
                VertexBufferElement { count: 4, kind: ElementKind::UnsignedByte, normalized: true },
            ]
        );
    }

    #[test]
    fn attributes_have_increasing_indices_and_offsets() {
        let layout = VertexBufferLayout::new()
            .with::<f32>(2)
            .with::<u8>(4)
            .with::<f32>(2);

        let placed: Vec<(u32, usize)> = layout
            .attributes()
            .map(|attribute| (attribute.index, attribute.offset))
            .collect();

        assert_eq!(placed, vec![(0, 0), (1, 8), (2, 12)]);
    }

    #[test]
    fn element_kinds_map_to_gl_enums() {
        assert_eq!(ElementKind::Float.gl_enum(), gl::FLOAT);
        assert_eq!(ElementKind::UnsignedInt.gl_enum(), gl::UNSIGNED_INT);
        assert_eq!(ElementKind::UnsignedByte.gl_enum(), gl::UNSIGNED_BYTE);
    }
}
