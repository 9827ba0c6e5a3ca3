use serde::{
    Deserialize,
    Serialize,
};
use strum::{
    Display,
    EnumIter,
    IntoEnumIterator as _,
};

/// The fixed set of BookStack resources the client talks to.
///
/// `Display` yields the path segment below `/api/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Endpoint {
    Shelves,
    Books,
    Chapters,
    Pages,
    Users,
    #[strum(to_string = "image-gallery")]
    Images,
    Attachments,
    System,
}

impl Endpoint {
    /// Endpoints that are listable and report a `total`.
    pub fn counted() -> impl Iterator<Item = Endpoint> {
        Endpoint::iter().filter(|endpoint| *endpoint != Endpoint::System)
    }

    pub fn path(&self) -> String {
        self.to_string()
    }

    pub fn detail_path(&self, id: u64) -> String {
        format!("{self}/{id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn paths() {
        assert_eq!(Endpoint::Images.path(), "image-gallery");
        assert_eq!(Endpoint::Shelves.detail_path(4), "shelves/4");
        assert_eq!(Endpoint::System.path(), "system");
    }

    #[test]
    fn counted_excludes_system() {
        let counted = Endpoint::counted().collect::<Vec<_>>();
        assert_eq!(counted.len(), 7);
        assert!(!counted.contains(&Endpoint::System));
        assert_eq!(counted.first(), Some(&Endpoint::Shelves));
    }
}
