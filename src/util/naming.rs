/// Produces unique labels of the form `<base>_<n>`.
///
/// A single counter is shared by every base, so no two labels minted by
/// the same instance collide, whatever their base is.
#[derive(Debug, Default)]
pub struct LabelNaming {
    index: usize,
}

impl LabelNaming {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next<S: AsRef<str>>(&mut self, base: S) -> String {
        let next = format!("{}_{}", base.as_ref(), self.index);

        self.index += 1;
        next
    }
}
