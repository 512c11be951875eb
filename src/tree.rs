use std::ops::Index;
use std::slice::{Iter, SliceIndex};

/// A node of the directory tree: either a folder or a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Folder(Folder),
    File(File),
}

impl Item {
    pub fn name(&self) -> &str {
        match self {
            Item::Folder(folder) => &folder.name,
            Item::File(file) => &file.name,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Item::File(_))
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            Item::Folder(folder) => Some(folder),
            Item::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&File> {
        match self {
            Item::File(file) => Some(file),
            Item::Folder(_) => None,
        }
    }
}

/// A folder in the directory tree.
///
/// Children keep insertion order. `id` is the index of the folder
/// record this node was created from; the synthetic root and the
/// per-section folders carry no record index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub name: String,
    pub id: Option<u32>,
    items: Vec<Item>,
}

impl Folder {
    /// The synthetic unnamed root.
    pub fn root() -> Folder {
        Folder::new(String::new(), None)
    }

    pub fn new(name: String, id: Option<u32>) -> Folder {
        Folder { name, id, items: Vec::new() }
    }

    /// Child with the given name, if any.
    pub fn get_item(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.name() == name)
    }

    /// Child folder named `name`, adding one if the name is missing or
    /// taken by a file. An existing folder keeps its original id.
    pub fn add_folder(&mut self, name: &str, id: Option<u32>) -> &mut Folder {
        let at = self.items.iter()
            .position(|item| item.name() == name && !item.is_file());
        let at = match at {
            Some(at) => at,
            None => {
                self.items.push(Item::Folder(Folder::new(name.to_owned(), id)));
                self.items.len() - 1
            }
        };
        match &mut self.items[at] {
            Item::Folder(folder) => folder,
            Item::File(_) => unreachable!(),
        }
    }

    /// Append a file node. `id` is the file-record index.
    pub fn add_file(&mut self, name: &str, id: u32) {
        self.items.push(Item::File(File { name: name.to_owned(), id }));
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<'a> IntoIterator for &'a Folder {
    type Item = &'a Item;
    type IntoIter = Iter<'a, Item>;
    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<I: SliceIndex<[Item]>> Index<I> for Folder {
    type Output = I::Output;

    #[inline]
    fn index(&self, index: I) -> &Self::Output {
        self.items.index(index)
    }
}

/// A file in the directory tree. `id` is the file-record index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub name: String,
    pub id: u32,
}
