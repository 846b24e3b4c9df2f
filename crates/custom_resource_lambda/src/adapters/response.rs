/// Delivers a serialized custom-resource response to CloudFormation's
/// pre-signed `ResponseURL`.
pub trait ResponseSender {
    fn send_response(&self, response_url: &str, body: &[u8]) -> Result<(), String>;
}
