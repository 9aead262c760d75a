pub mod career_record;
pub mod company_document;
pub mod department;
pub mod file;
pub mod folder;
pub mod user;

pub use career_record::Entity as CareerRecord;
pub use company_document::Entity as CompanyDocument;
pub use department::Entity as Department;
pub use file::Entity as File;
pub use folder::Entity as Folder;
pub use user::Entity as User;
