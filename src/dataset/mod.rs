use std::io::Result as IOResult;
use std::marker::PhantomData;
use std::ops;
use std::path::Path;
use std::slice::{Iter, SliceIndex};

use crate::io::{BufFileReader, FileOpen, Read};
use crate::preprocessing::Preprocess;

pub mod conll;

/// An in-memory collection of preprocessed samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<T> {
    items: Vec<T>,
}

impl<T> Dataset<T> {
    pub fn new() -> Self {
        Dataset { items: vec![] }
    }

    pub fn from_items(items: Vec<T>) -> Self {
        Dataset { items: items }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Dataset {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> Iter<T> {
        self.items.iter()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for Dataset<T> {
    fn default() -> Self {
        Dataset::new()
    }
}

impl<T, I: SliceIndex<[T]>> ops::Index<I> for Dataset<T> {
    type Output = I::Output;

    #[inline]
    fn index(&self, index: I) -> &Self::Output {
        ops::Index::index(&self.items, index)
    }
}

impl<T, I: SliceIndex<[T]>> ops::IndexMut<I> for Dataset<T> {
    #[inline]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        ops::IndexMut::index_mut(&mut self.items, index)
    }
}

impl<T> IntoIterator for Dataset<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Dataset<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

pub trait Load {
    type Item;

    fn load<P: AsRef<Path>>(&mut self, file: P) -> IOResult<Dataset<Self::Item>> {
        self.load_until(file, usize::MAX)
    }

    fn load_until<P: AsRef<Path>>(&mut self, file: P, size: usize)
        -> IOResult<Dataset<Self::Item>>;
}

/// Reads samples with `R` and pipes them through a preprocessor.
///
/// Fitting is enabled by default; `fix` freezes the preprocessor so that
/// later loads only transform.
pub struct Loader<R, P> {
    _reader: PhantomData<R>,
    preprocessor: P,
    enable_fit: bool,
}

impl<T, R: Read<Item = T>, P: Preprocess<T>> Loader<R, P> {
    pub fn new(preprocessor: P) -> Self {
        Loader {
            _reader: PhantomData,
            preprocessor: preprocessor,
            enable_fit: true,
        }
    }

    pub fn unfix(&mut self) {
        self.enable_fit = true;
    }

    pub fn fix(&mut self) {
        self.enable_fit = false;
    }

    pub fn preprocessor(&self) -> &P {
        &self.preprocessor
    }

    pub fn preprocessor_mut(&mut self) -> &mut P {
        &mut self.preprocessor
    }

    pub fn into_preprocessor(self) -> P {
        self.preprocessor
    }
}

impl<T, P: Preprocess<T>, R: FileOpen + Read<Item = T>> Load for Loader<R, P> {
    type Item = P::Output;

    fn load_until<PATH: AsRef<Path>>(
        &mut self,
        file: PATH,
        size: usize,
    ) -> IOResult<Dataset<Self::Item>> {
        let mut reader = R::open(file)?;
        let mut buf = vec![];
        reader.read_upto(size, &mut buf)?;
        let items = if self.enable_fit {
            self.preprocessor.fit_transform(buf.into_iter()).collect()
        } else {
            self.preprocessor.transform(buf.into_iter()).collect()
        };
        Ok(Dataset::from_items(items))
    }
}

pub type StdLoader<T, P> = Loader<BufFileReader<T>, P>;
