use std::collections::BTreeMap;

/// Attribute lookup table built from an [`AttributeChain`].
pub type AttributeMap = BTreeMap<String, String>;

/// One `name = value` entry of an attribute chain.
#[derive(Debug)]
pub struct AttributeNode {
    pub name: String,
    pub value: String,
    next: Option<Box<AttributeNode>>,
}

/// Singly linked list of attributes as produced by the file reader.
///
/// The reader prepends every item, so the chain runs in reverse file order.
///
/// # Examples
/// ```
/// use pivfile_core::AttributeChain;
///
/// let mut chain = AttributeChain::new();
/// chain.push_front("_SCALE_X", "1 0 mm x");
/// chain.push_front("_SCALE_X", "2 0 mm x");
/// let map = chain.to_map();
/// assert_eq!(map["_SCALE_X"], "1 0 mm x");
/// ```
#[derive(Debug, Default)]
pub struct AttributeChain {
    head: Option<Box<AttributeNode>>,
    len: usize,
}

impl AttributeChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_front(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let node = Box::new(AttributeNode {
            name: name.into(),
            value: value.into(),
            next: self.head.take(),
        });
        self.head = Some(node);
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    /// Walk the chain into a map; on duplicate names the later entry wins.
    pub fn to_map(&self) -> AttributeMap {
        let mut map = AttributeMap::new();
        for (name, value) in self.iter() {
            log::debug!("attribute {}: {}", name, value);
            map.insert(name.to_string(), value.to_string());
        }
        map
    }

    /// Free every node.
    pub fn clear(&mut self) {
        let mut next = self.head.take();
        while let Some(mut node) = next {
            next = node.next.take();
        }
        self.len = 0;
    }
}

impl Drop for AttributeChain {
    fn drop(&mut self) {
        self.clear();
    }
}

pub struct Iter<'a> {
    next: Option<&'a AttributeNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| {
            self.next = node.next.as_deref();
            (node.name.as_str(), node.value.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::AttributeChain;

    #[test]
    fn iterates_in_chain_order() {
        let mut chain = AttributeChain::new();
        chain.push_front("a", "1");
        chain.push_front("b", "2");
        let items: Vec<_> = chain.iter().collect();
        assert_eq!(items, vec![("b", "2"), ("a", "1")]);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn later_chain_entry_overwrites_earlier() {
        let mut chain = AttributeChain::new();
        chain.push_front("key", "last");
        chain.push_front("other", "x");
        chain.push_front("key", "first");
        let map = chain.to_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map["key"], "last");
    }

    #[test]
    fn clear_releases_long_chains() {
        let mut chain = AttributeChain::new();
        for i in 0..200_000 {
            chain.push_front(format!("k{i}"), "v");
        }
        chain.clear();
        assert!(chain.is_empty());
        assert_eq!(chain.len(), 0);
        assert!(chain.to_map().is_empty());
    }
}
