/// One or more phone values supplied at the API boundary.
///
/// A single number and a list of numbers are both accepted and normalized
/// to an ordered list, so callers never have to wrap a lone number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Phones(Vec<String>);

impl Phones {
    /// An empty phone set. Passed to `ClientChanges::phones` it clears every
    /// phone the client has.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    /// Parse a comma separated list as typed into the client wizard.
    /// Blank entries are skipped.
    pub fn parse_list(input: &str) -> Self {
        Self(
            input
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }
}

impl From<&str> for Phones {
    fn from(phone: &str) -> Self {
        Self(vec![phone.to_owned()])
    }
}

impl From<String> for Phones {
    fn from(phone: String) -> Self {
        Self(vec![phone])
    }
}

impl From<Vec<String>> for Phones {
    fn from(phones: Vec<String>) -> Self {
        Self(phones)
    }
}

impl From<Vec<&str>> for Phones {
    fn from(phones: Vec<&str>) -> Self {
        Self(phones.into_iter().map(str::to_owned).collect())
    }
}

impl From<&[&str]> for Phones {
    fn from(phones: &[&str]) -> Self {
        Self(phones.iter().map(|p| (*p).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Phones {
    fn from(phones: [&str; N]) -> Self {
        Self(phones.iter().map(|p| (*p).to_owned()).collect())
    }
}

impl<'a> IntoIterator for &'a Phones {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
