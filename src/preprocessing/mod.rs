pub use self::encoder::*;
pub use self::tagset::*;
pub use self::vocab::*;

mod encoder;
mod tagset;
mod vocab;

#[derive(Clone, Debug)]
pub struct Transform<I, C> {
    iter: I,
    caller: C,
    fit: bool,
}

impl<'a, I, P, T> Iterator for Transform<I, &'a P>
where
    I: Iterator<Item = T>,
    P: Preprocess<T>,
{
    type Item = P::Output;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|x| self.caller.transform_each(x))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<'a, I, P, T> Iterator for Transform<I, &'a mut P>
where
    I: Iterator<Item = T>,
    P: Preprocess<T>,
{
    type Item = P::Output;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let x = self.iter.next()?;
        if self.fit {
            Some(self.caller.fit_transform_each(x))
        } else {
            Some(self.caller.transform_each(x))
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

/// Stateful input encoding: `fit` grows the internal state while
/// encoding, `transform` encodes with the state frozen.
pub trait Preprocess<T> {
    type Output;

    fn fit<I: Iterator<Item = T>>(&mut self, xs: I) {
        for x in xs {
            self.fit_each(&x);
        }
    }

    #[allow(unused_variables)]
    fn fit_each(&mut self, x: &T) -> Option<Self::Output> {
        None
    }

    fn transform<I: Iterator<Item = T>>(&self, xs: I) -> Transform<I, &Self> {
        Transform {
            iter: xs,
            caller: self,
            fit: false,
        }
    }

    fn transform_each(&self, x: T) -> Self::Output;

    fn fit_transform<I: Iterator<Item = T>>(&mut self, xs: I) -> Transform<I, &mut Self> {
        Transform {
            iter: xs,
            caller: self,
            fit: true,
        }
    }

    fn fit_transform_each(&mut self, x: T) -> Self::Output {
        match self.fit_each(&x) {
            Some(y) => y,
            None => self.transform_each(x),
        }
    }
}
