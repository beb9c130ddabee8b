pub mod biome;
pub mod catalog;
pub mod config;
pub mod generator;
pub mod graph;
pub mod hex;
pub mod logging;
pub mod lottery;
pub mod loot;
pub mod map;
pub mod progression;
pub mod rng;
pub mod snapshot;
pub mod world;

pub use config::{ConfigLoader, GeneratorConfig};
pub use generator::{GenerationError, GeneratorSettings, WorldGenerator, WorldGeneratorBuilder};
pub use lottery::{Lottery, LotteryError};
pub use world::{World, WorldSnapshot};
