use std::fmt;

/// Custom error type for allwrite operations
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Provider is not configured or not initialized
    ProviderUnavailable(String)
  , /// HTTP request error
    HttpError(String)
  , /// API returned an error response
    ApiError(String)
  , /// Failed to parse API response
    ParseError(String)
  , /// No choices in API response
    NoChoicesInResponse
  , /// Provider answered with blank content
    EmptyResponse(String)
  , /// Provider attempt exceeded its timeout
    Timeout(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Configuration file could not be read or parsed
    ConfigLoad(String)
  , /// A refinement step failed
    Refinement(String)
  , /// Backend task is gone
    BackendDisconnected
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::ProviderUnavailable(provider) => {
              write!(f, "Provider unavailable: {}", provider)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError(msg) => {
              write!(f, "API error: {}", msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::NoChoicesInResponse => {
              write!(f, "API response contained no choices")
            }
          , Error::EmptyResponse(provider) => {
              write!(f, "Empty response from: {}", provider)
            }
          , Error::Timeout(provider) => {
              write!(f, "Request to {} timed out", provider)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::ConfigLoad(msg) => {
              write!(f, "Failed to load configuration: {}", msg)
            }
          , Error::Refinement(msg) => {
              write!(f, "Refinement failed: {}", msg)
            }
          , Error::BackendDisconnected => {
              write!(f, "Backend disconnected")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<regex::Error> for Error
{   fn from(e: regex::Error) -> Self
    {   Error::Refinement(e.to_string())
    }
}

impl From<serde_json::Error> for Error
{   fn from(e: serde_json::Error) -> Self
    {   Error::ConfigLoad(e.to_string())
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn display_names_the_provider()
    {   let e = Error::Timeout("openai".to_string());
        assert_eq!(e.to_string(), "Request to openai timed out");
        let e = Error::ProviderUnavailable("local".to_string());
        assert_eq!(e.to_string(), "Provider unavailable: local");
    }

    #[test]
    fn regex_errors_become_refinement_errors()
    {   let err = regex::Regex::new("(").unwrap_err();
        assert!(matches!(Error::from(err), Error::Refinement(_)));
    }
}
