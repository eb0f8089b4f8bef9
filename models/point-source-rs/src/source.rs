use rand::{RngCore, SeedableRng, TryRngCore, rngs::StdRng};

use crate::error::{Error, Result};

/// Adapts a fallible random source for use with the samplers.
///
/// The first failure is recorded and the remaining draws of the current
/// sample come from a fixed stand-in stream, so rejection samplers still
/// terminate. Callers must `check` after each sample and discard it on error.
pub(crate) struct CheckedSource<'a, R: TryRngCore + ?Sized> {
    inner: &'a mut R,
    failure: Option<String>,
    stand_in: Option<StdRng>,
}

impl<'a, R: TryRngCore + ?Sized> CheckedSource<'a, R> {
    pub(crate) fn new(inner: &'a mut R) -> Self {
        Self {
            inner,
            failure: None,
            stand_in: None,
        }
    }

    pub(crate) fn check(&mut self) -> Result<()> {
        match self.failure.take() {
            Some(message) => Err(Error::RandomSource(message)),
            None => Ok(()),
        }
    }

    fn fail(&mut self, err: R::Error) -> &mut StdRng {
        if self.failure.is_none() {
            self.failure = Some(err.to_string());
        }
        self.stand_in.get_or_insert_with(|| StdRng::seed_from_u64(0))
    }
}

impl<R: TryRngCore + ?Sized> RngCore for CheckedSource<'_, R> {
    fn next_u32(&mut self) -> u32 {
        if let Some(stand_in) = self.stand_in.as_mut() {
            return stand_in.next_u32();
        }
        match self.inner.try_next_u32() {
            Ok(value) => value,
            Err(err) => self.fail(err).next_u32(),
        }
    }

    fn next_u64(&mut self) -> u64 {
        if let Some(stand_in) = self.stand_in.as_mut() {
            return stand_in.next_u64();
        }
        match self.inner.try_next_u64() {
            Ok(value) => value,
            Err(err) => self.fail(err).next_u64(),
        }
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        if let Some(stand_in) = self.stand_in.as_mut() {
            return stand_in.fill_bytes(dst);
        }
        if let Err(err) = self.inner.try_fill_bytes(dst) {
            self.fail(err).fill_bytes(dst);
        }
    }
}
