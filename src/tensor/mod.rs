use std::io;
use std::ops::{Add, Div, Mul, Sub};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

/// Index types usable as tensor coordinates.
///
/// The type also fixes the on-disk width of axis extents: extents are
/// written in the index type's native width, little-endian (`usize` is
/// stored as 8 bytes).
pub trait TensorIndex: Copy + Eq {
    fn as_usize(self) -> usize;

    fn from_usize(n: usize) -> Self;

    fn read_extent<R: io::Read>(reader: &mut R) -> io::Result<Self>;

    fn write_extent<W: io::Write>(self, writer: &mut W) -> io::Result<()>;
}

impl TensorIndex for u8 {
    fn as_usize(self) -> usize {
        self as usize
    }

    fn from_usize(n: usize) -> Self {
        n as u8
    }

    fn read_extent<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        reader.read_u8()
    }

    fn write_extent<W: io::Write>(self, writer: &mut W) -> io::Result<()> {
        writer.write_u8(self)
    }
}

impl TensorIndex for u16 {
    fn as_usize(self) -> usize {
        self as usize
    }

    fn from_usize(n: usize) -> Self {
        n as u16
    }

    fn read_extent<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        reader.read_u16::<LittleEndian>()
    }

    fn write_extent<W: io::Write>(self, writer: &mut W) -> io::Result<()> {
        writer.write_u16::<LittleEndian>(self)
    }
}

impl TensorIndex for u32 {
    fn as_usize(self) -> usize {
        self as usize
    }

    fn from_usize(n: usize) -> Self {
        n as u32
    }

    fn read_extent<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        reader.read_u32::<LittleEndian>()
    }

    fn write_extent<W: io::Write>(self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self)
    }
}

impl TensorIndex for u64 {
    fn as_usize(self) -> usize {
        self as usize
    }

    fn from_usize(n: usize) -> Self {
        n as u64
    }

    fn read_extent<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        reader.read_u64::<LittleEndian>()
    }

    fn write_extent<W: io::Write>(self, writer: &mut W) -> io::Result<()> {
        writer.write_u64::<LittleEndian>(self)
    }
}

impl TensorIndex for usize {
    fn as_usize(self) -> usize {
        self
    }

    fn from_usize(n: usize) -> Self {
        n
    }

    fn read_extent<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        reader.read_u64::<LittleEndian>().map(|n| n as usize)
    }

    fn write_extent<W: io::Write>(self, writer: &mut W) -> io::Result<()> {
        writer.write_u64::<LittleEndian>(self as u64)
    }
}

/// Element types with a fixed little-endian byte representation.
pub trait TensorElement: Copy {
    fn read_element<R: io::Read>(reader: &mut R) -> io::Result<Self>;

    fn write_element<W: io::Write>(self, writer: &mut W) -> io::Result<()>;
}

impl TensorElement for f32 {
    fn read_element<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        reader.read_f32::<LittleEndian>()
    }

    fn write_element<W: io::Write>(self, writer: &mut W) -> io::Result<()> {
        writer.write_f32::<LittleEndian>(self)
    }
}

impl TensorElement for f64 {
    fn read_element<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        reader.read_f64::<LittleEndian>()
    }

    fn write_element<W: io::Write>(self, writer: &mut W) -> io::Result<()> {
        writer.write_f64::<LittleEndian>(self)
    }
}

impl TensorElement for i32 {
    fn read_element<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        reader.read_i32::<LittleEndian>()
    }

    fn write_element<W: io::Write>(self, writer: &mut W) -> io::Result<()> {
        writer.write_i32::<LittleEndian>(self)
    }
}

impl TensorElement for u32 {
    fn read_element<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        reader.read_u32::<LittleEndian>()
    }

    fn write_element<W: io::Write>(self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self)
    }
}

/// Numeric elements supporting smoothed normalization.
pub trait Scalar:
    Copy
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
    const ZERO: Self;

    fn from_usize(n: usize) -> Self;

    fn ln(self) -> Self;
}

impl Scalar for f32 {
    const ZERO: Self = 0.0;

    fn from_usize(n: usize) -> Self {
        n as f32
    }

    fn ln(self) -> Self {
        f32::ln(self)
    }
}

impl Scalar for f64 {
    const ZERO: Self = 0.0;

    fn from_usize(n: usize) -> Self {
        n as f64
    }

    fn ln(self) -> Self {
        f64::ln(self)
    }
}

/// Dense row-major tensor with a fixed number of axes.
///
/// The buffer is flat; a precomputed stride table maps coordinates to
/// offsets (the last axis varies fastest).
#[derive(Debug, Clone)]
pub struct Tensor<N, I, const ARITY: usize> {
    sizes: [I; ARITY],
    strides: [usize; ARITY],
    data: Vec<N>,
}

impl<N: Copy, I: TensorIndex, const ARITY: usize> Tensor<N, I, ARITY> {
    /// Allocates a tensor of the given shape with every cell set to `fill`.
    pub fn new(fill: N, sizes: [I; ARITY]) -> Self {
        let (strides, len) = strides_for(&sizes);
        Tensor {
            sizes: sizes,
            strides: strides,
            data: vec![fill; len],
        }
    }

    /// Discards the contents and reallocates for the new shape.
    pub fn resize(&mut self, fill: N, sizes: [I; ARITY]) {
        let (strides, len) = strides_for(&sizes);
        self.sizes = sizes;
        self.strides = strides;
        self.data.clear();
        self.data.resize(len, fill);
    }

    /// Sets every cell to `value`, keeping the shape.
    pub fn fill(&mut self, value: N) {
        for v in self.data.iter_mut() {
            *v = value;
        }
    }

    /// Total number of cells.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Extent of one axis.
    #[inline]
    pub fn size_at(&self, axis: usize) -> I {
        self.sizes[axis]
    }

    #[inline]
    pub fn shape(&self) -> &[I; ARITY] {
        &self.sizes
    }

    #[inline]
    fn offset(&self, ix: &[I; ARITY]) -> usize {
        let mut offset = 0;
        for k in 0..ARITY {
            offset += ix[k].as_usize() * self.strides[k];
        }
        offset
    }

    #[inline]
    fn check_bounds(&self, ix: &[I; ARITY]) {
        for k in 0..ARITY {
            assert!(
                ix[k].as_usize() < self.sizes[k].as_usize(),
                "tensor index {} out of range on axis {} (extent {})",
                ix[k].as_usize(),
                k,
                self.sizes[k].as_usize()
            );
        }
    }

    /// Bounds-checked cell access; panics on an out-of-range coordinate.
    #[inline]
    pub fn at(&self, ix: [I; ARITY]) -> &N {
        self.check_bounds(&ix);
        &self.data[self.offset(&ix)]
    }

    #[inline]
    pub fn at_mut(&mut self, ix: [I; ARITY]) -> &mut N {
        self.check_bounds(&ix);
        let offset = self.offset(&ix);
        &mut self.data[offset]
    }

    /// Unchecked cell access.
    ///
    /// The caller must guarantee every coordinate is within its axis extent.
    #[inline]
    pub unsafe fn at_unchecked(&self, ix: [I; ARITY]) -> &N {
        self.data.get_unchecked(self.offset(&ix))
    }

    #[inline]
    pub unsafe fn at_unchecked_mut(&mut self, ix: [I; ARITY]) -> &mut N {
        let offset = self.offset(&ix);
        self.data.get_unchecked_mut(offset)
    }
}

impl<N: Scalar, I: TensorIndex, const ARITY: usize> Tensor<N, I, ARITY> {
    /// Sum over every cell whose coordinate on `axis` equals `at`.
    pub fn marginal_sum(&self, axis: usize, at: I) -> N {
        assert!(axis < ARITY, "axis {} out of range", axis);
        let stride = self.strides[axis];
        let extent = self.sizes[axis].as_usize();
        let coord = at.as_usize();
        assert!(coord < extent, "coordinate {} out of range on axis {}", coord, axis);
        let mut sum = N::ZERO;
        for (flat, v) in self.data.iter().enumerate() {
            if flat / stride % extent == coord {
                sum = sum + *v;
            }
        }
        sum
    }

    fn axis_sums(&self, axis: usize) -> Vec<N> {
        let stride = self.strides[axis];
        let extent = self.sizes[axis].as_usize();
        let mut sums = vec![N::ZERO; extent];
        for (flat, v) in self.data.iter().enumerate() {
            sums[flat / stride % extent] = sums[flat / stride % extent] + *v;
        }
        sums
    }

    /// Smoothed normalization grouped by the coordinate on `axis`.
    ///
    /// Each cell becomes `(v + s) / (S + s * G)` where `S` is the marginal
    /// sum of the cell's group and `G` the number of cells per group.
    pub fn normalize(&mut self, smoothing: N, axis: usize) {
        assert!(axis < ARITY, "axis {} out of range", axis);
        if self.data.is_empty() {
            return;
        }
        let sums = self.axis_sums(axis);
        let group = N::from_usize(self.data.len() / sums.len());
        let denoms: Vec<N> = sums.iter().map(|&s| s + smoothing * group).collect();
        let stride = self.strides[axis];
        let extent = self.sizes[axis].as_usize();
        for (flat, v) in self.data.iter_mut().enumerate() {
            *v = (*v + smoothing) / denoms[flat / stride % extent];
        }
    }

    /// Log-space variant of [`normalize`]: `ln(v + s) - ln(S + s * G)`.
    ///
    /// [`normalize`]: #method.normalize
    pub fn normalize_log(&mut self, smoothing: N, axis: usize) {
        assert!(axis < ARITY, "axis {} out of range", axis);
        if self.data.is_empty() {
            return;
        }
        let sums = self.axis_sums(axis);
        let group = N::from_usize(self.data.len() / sums.len());
        let denoms: Vec<N> = sums.iter().map(|&s| (s + smoothing * group).ln()).collect();
        let stride = self.strides[axis];
        let extent = self.sizes[axis].as_usize();
        for (flat, v) in self.data.iter_mut().enumerate() {
            *v = (*v + smoothing).ln() - denoms[flat / stride % extent];
        }
    }
}

impl<N: TensorElement, I: TensorIndex, const ARITY: usize> Tensor<N, I, ARITY> {
    /// Writes arity, axis extents and the raw buffer, little-endian.
    pub fn save_binary<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u8(ARITY as u8)?;
        for k in 0..ARITY {
            self.sizes[k].write_extent(writer)?;
        }
        for v in self.data.iter() {
            v.write_element(writer)?;
        }
        Ok(())
    }

    /// Replaces the tensor with one read from `reader`.
    ///
    /// Fails with `InvalidData` on an arity mismatch or a zero-sized axis
    /// and with `UnexpectedEof` on a truncated stream; after a failure the
    /// target should be discarded.
    pub fn load_binary<R: io::Read>(&mut self, reader: &mut R) -> io::Result<()> {
        let arity = reader.read_u8()?;
        if arity as usize != ARITY {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("tensor arity mismatch: expected {}, found {}", ARITY, arity),
            ));
        }
        let mut sizes = [I::from_usize(0); ARITY];
        for k in 0..ARITY {
            sizes[k] = I::read_extent(reader)?;
            if sizes[k].as_usize() == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("tensor axis {} has zero extent", k),
                ));
            }
        }
        let (strides, len) = strides_for(&sizes);
        let mut data = Vec::with_capacity(len);
        for _ in 0..len {
            data.push(N::read_element(reader)?);
        }
        self.sizes = sizes;
        self.strides = strides;
        self.data = data;
        Ok(())
    }
}

impl<N: PartialEq, I: TensorIndex, const ARITY: usize> PartialEq for Tensor<N, I, ARITY> {
    fn eq(&self, other: &Self) -> bool {
        self.sizes == other.sizes && self.data == other.data
    }
}

fn strides_for<I: TensorIndex, const ARITY: usize>(sizes: &[I; ARITY]) -> ([usize; ARITY], usize) {
    let mut strides = [0usize; ARITY];
    let mut len = 1usize;
    for k in (0..ARITY).rev() {
        strides[k] = len;
        len *= sizes[k].as_usize();
    }
    (strides, len)
}
