//! Provider attempt order for one `generate` call

use log::debug;

/// Ordered provider ids for a single generation call.
///
/// Built from the configured default order, with the caller's preferred
/// provider (when it is registered and available) moved to the front.
/// Every id appears at most once, so no provider is tried twice.
#[derive(Debug, Clone, PartialEq)]
pub struct FailoverSequence
{   pub providers: Vec<String>
  , pub current_index: usize
}

impl FailoverSequence
{   /// Create a new failover sequence
    pub fn new(
      providers: Vec<String>
    ) -> Self
    {   debug!(
          "Creating failover sequence with {} providers",
          providers.len()
        );
        FailoverSequence
        {   providers
          , current_index: 0
        }
    }

    /// Plan the attempt order.
    ///
    /// `order` is the configured priority list, `registered` the ids of
    /// built adapters in registration order and `preferred` the caller's
    /// choice. Ids in `order` without an adapter are dropped; adapters
    /// missing from `order` go last.
    pub fn plan(
      order: &[String]
    , registered: &[String]
    , preferred: Option<&str>
    ) -> Self
    {   let mut providers: Vec<String> = Vec::new();

        if let Some(id) = preferred
        {   if registered.iter().any(|r| r == id)
            {   providers.push(id.to_string());
            } else
            {   debug!("Preferred provider '{}' is not registered", id);
            }
        }

        let ordered = order.iter()
          .filter(|id| registered.contains(id));
        let unordered = registered.iter()
          .filter(|id| !order.contains(id));
        for id in ordered.chain(unordered)
        {   if !providers.contains(id)
            {   providers.push(id.clone());
            }
        }

        Self::new(providers)
    }

    /// Get the current provider
    pub fn current(&self) -> Option<&str>
    {   self.providers.get(self.current_index).map(|s| s.as_str())
    }

    /// Move to the next provider
    pub fn next(&mut self) -> Option<&str>
    {   self.current_index += 1;
        self.current()
    }
}
