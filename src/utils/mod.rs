pub mod http_client;
pub mod oauth;

#[cfg(test)]
pub mod test_http;
