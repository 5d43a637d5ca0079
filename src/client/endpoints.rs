//! Endpoint paths, relative to the configured API prefix

pub const LOGIN: &str = "auth/login";
pub const REGISTER: &str = "auth/register";
pub const AUTHORS: &str = "authors";
pub const PUBLISHERS: &str = "publishers";
pub const BOOKS: &str = "books";
pub const BOOK_EDITIONS: &str = "book-editions";
pub const BOOK_COPIES: &str = "books/exact-book/create-book";
pub const USERS: &str = "users";
pub const LIBRARIANS: &str = "librarians";
pub const RENTALS: &str = "rentals";

pub fn rental(rental_id: i64) -> String {
    format!("{}/{}", RENTALS, rental_id)
}

pub fn rental_return(rental_id: i64) -> String {
    format!("{}/{}/return", RENTALS, rental_id)
}

pub fn book_reviews(book_id: i64) -> String {
    format!("{}/{}/reviews", BOOKS, book_id)
}
