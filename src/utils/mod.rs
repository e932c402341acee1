pub mod password;
pub mod time_parser;
pub mod url_validator;

/// 短链接字符集：A-Z a-z 0-9
pub const SHORT_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    iter::repeat_with(|| SHORT_ALPHABET[rand::random_range(0..SHORT_ALPHABET.len())] as char)
        .take(length)
        .collect()
}

/// 返回第一个不在字符集中的字符
pub fn first_non_alphanumeric(input: &str) -> Option<char> {
    input.chars().find(|c| !c.is_ascii_alphanumeric())
}
