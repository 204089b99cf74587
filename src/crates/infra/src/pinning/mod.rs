pub mod storacha;
