//! Authorization URL for the authorization-code flow.

use crate::session::Session;
use melhor_envio_core::Result;
use url::Url;

/// Authorization endpoint path.
pub const AUTHORIZE_PATH: &str = "/oauth/authorize";

impl Session {
    /// URL the user must open to grant the application access.
    ///
    /// After consent the API redirects to the configured redirect URI with a
    /// `code` query parameter; hand it to [`Session::set_authorization_code`]
    /// and call [`Session::authenticate_by_code`].
    pub fn authorize_url(&self, state: Option<&str>) -> Result<Url> {
        let client_id = self.credentials.read().client_id;
        let mut url = self.endpoint(AUTHORIZE_PATH)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", &client_id.to_string());
            if let Some(redirect_uri) = &self.redirect_uri {
                query.append_pair("redirect_uri", redirect_uri);
            }
            query.append_pair("response_type", "code");
            if let Some(state) = state {
                query.append_pair("state", state);
            }
            if !self.scopes.is_empty() {
                query.append_pair("scope", &self.scopes.join(" "));
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::config_for;
    use crate::Session;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_authorize_url() {
        let config = config_for("https://sandbox.melhorenvio.com.br")
            .with_scopes(["cart-read", "cart-write", "shipping-calculate"]);
        let session = Session::new(config).unwrap();

        let url = session.authorize_url(Some("xyz")).unwrap();

        assert_eq!(
            url.as_str(),
            "https://sandbox.melhorenvio.com.br/oauth/authorize?client_id=1234\
             &redirect_uri=https%3A%2F%2Floja.example.com%2Fcallback\
             &response_type=code&state=xyz\
             &scope=cart-read+cart-write+shipping-calculate"
        );
    }

    #[test]
    fn test_authorize_url_minimal() {
        let mut config = config_for("https://melhorenvio.com.br");
        config.redirect_uri = None;
        let session = Session::new(config).unwrap();

        let url = session.authorize_url(None).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(
            pairs,
            vec![
                ("client_id".to_string(), "1234".to_string()),
                ("response_type".to_string(), "code".to_string()),
            ]
        );
    }
}
