pub mod router;

pub use router::StoreRouter;
