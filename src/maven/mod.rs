mod coordinate;

pub use coordinate::MavenCoordinate;

/// Well-known Maven repositories in the Minecraft ecosystem.
pub const MOJANG_LIBRARIES: &str = "https://libraries.minecraft.net";
pub const FORGE_MAVEN: &str = "https://files.minecraftforge.net/maven";
pub const FABRIC_MAVEN: &str = "https://maven.fabricmc.net";
