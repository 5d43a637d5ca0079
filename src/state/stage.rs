use std::fmt;
use std::str::FromStr;

/// One unit of the seeding pipeline, responsible for one entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Authors,
    Publishers,
    Books,
    Editions,
    Copies,
    Users,
    Librarians,
    Rentals,
    Reviews,
}

impl Stage {
    /// Every stage in execution order; each stage only reads keys produced
    /// by stages listed before it
    pub const ALL: [Stage; 9] = [
        Stage::Authors,
        Stage::Publishers,
        Stage::Books,
        Stage::Editions,
        Stage::Copies,
        Stage::Users,
        Stage::Librarians,
        Stage::Rentals,
        Stage::Reviews,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Authors => "authors",
            Stage::Publishers => "publishers",
            Stage::Books => "books",
            Stage::Editions => "book_editions",
            Stage::Copies => "book_copies",
            Stage::Users => "users",
            Stage::Librarians => "librarians",
            Stage::Rentals => "rentals",
            Stage::Reviews => "reviews",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "authors" => Ok(Stage::Authors),
            "publishers" => Ok(Stage::Publishers),
            "books" => Ok(Stage::Books),
            "book_editions" | "editions" => Ok(Stage::Editions),
            "book_copies" | "copies" => Ok(Stage::Copies),
            "users" | "readers" => Ok(Stage::Users),
            "librarians" => Ok(Stage::Librarians),
            "rentals" => Ok(Stage::Rentals),
            "reviews" => Ok(Stage::Reviews),
            other => Err(format!("unknown stage '{}'", other)),
        }
    }
}

/// Named slot in the pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateKey {
    AuthorIds,
    PublisherIds,
    BookIds,
    BookEditionIds,
    BookIdToEditionIds,
    BookEditionIdsByBook,
    BookCopyIds,
    BookCopyIdsByEdition,
    ReaderUsernames,
    ReaderIds,
    ReaderIdsByUsername,
    UserCredentials,
    UserCredentialsPath,
    LibrarianUsernames,
    RentalIds,
    ReturnedRentalIds,
    RentedCopyIds,
    ReviewIds,
    ReviewsCreated,
}

impl StateKey {
    pub fn as_str(self) -> &'static str {
        match self {
            StateKey::AuthorIds => "author_ids",
            StateKey::PublisherIds => "publisher_ids",
            StateKey::BookIds => "book_ids",
            StateKey::BookEditionIds => "book_edition_ids",
            StateKey::BookIdToEditionIds => "book_id_to_edition_ids",
            StateKey::BookEditionIdsByBook => "book_edition_ids_by_book",
            StateKey::BookCopyIds => "book_copy_ids",
            StateKey::BookCopyIdsByEdition => "book_copy_ids_by_edition",
            StateKey::ReaderUsernames => "reader_usernames",
            StateKey::ReaderIds => "reader_ids",
            StateKey::ReaderIdsByUsername => "reader_ids_by_username",
            StateKey::UserCredentials => "user_credentials",
            StateKey::UserCredentialsPath => "user_credentials_path",
            StateKey::LibrarianUsernames => "librarian_usernames",
            StateKey::RentalIds => "rental_ids",
            StateKey::ReturnedRentalIds => "returned_rental_ids",
            StateKey::RentedCopyIds => "rented_copy_ids",
            StateKey::ReviewIds => "review_ids",
            StateKey::ReviewsCreated => "reviews_created",
        }
    }

    /// The stage that writes this key
    pub fn producer(self) -> Stage {
        match self {
            StateKey::AuthorIds => Stage::Authors,
            StateKey::PublisherIds => Stage::Publishers,
            StateKey::BookIds => Stage::Books,
            StateKey::BookEditionIds
            | StateKey::BookIdToEditionIds
            | StateKey::BookEditionIdsByBook => Stage::Editions,
            StateKey::BookCopyIds | StateKey::BookCopyIdsByEdition => Stage::Copies,
            StateKey::ReaderUsernames
            | StateKey::ReaderIds
            | StateKey::ReaderIdsByUsername
            | StateKey::UserCredentials
            | StateKey::UserCredentialsPath => Stage::Users,
            StateKey::LibrarianUsernames => Stage::Librarians,
            StateKey::RentalIds | StateKey::ReturnedRentalIds | StateKey::RentedCopyIds => {
                Stage::Rentals
            }
            StateKey::ReviewIds | StateKey::ReviewsCreated => Stage::Reviews,
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
