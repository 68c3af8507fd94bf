use ahash::AHashMap;
use parking_lot::RwLock;

/// Ticker -> upstream internal id (the `stockId` some endpoints want instead
/// of the symbol). Written only by a full listing scan, never pruned.
#[derive(Default)]
pub struct SymbolDirectory {
    ids: RwLock<AHashMap<String, String>>,
}

impl SymbolDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, ticker: &str) -> Option<String> {
        self.ids.read().get(ticker).cloned()
    }

    /// Insert or overwrite every `(ticker, id)` pair from one listing scan.
    pub fn record_all<'a, I>(&self, pairs: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut ids = self.ids.write();
        for (ticker, id) in pairs {
            ids.insert(ticker.to_string(), id.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.ids.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_lookup() {
        let dir = SymbolDirectory::new();
        assert!(dir.is_empty());

        dir.record_all([("JKH.N0000", "101"), ("DIAL.N0000", "202")]);
        assert_eq!(dir.lookup("JKH.N0000").as_deref(), Some("101"));
        assert_eq!(dir.lookup("COMB.N0000"), None);
        assert_eq!(dir.len(), 2);
    }

    #[test]
    fn test_rescan_overwrites_but_keeps_unlisted() {
        let dir = SymbolDirectory::new();
        dir.record_all([("JKH.N0000", "101"), ("DIAL.N0000", "202")]);
        dir.record_all([("JKH.N0000", "999")]);

        assert_eq!(dir.lookup("JKH.N0000").as_deref(), Some("999"));
        assert_eq!(dir.lookup("DIAL.N0000").as_deref(), Some("202"));
    }
}
