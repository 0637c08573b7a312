// Déclaration des modules disponibles dans le CLI

pub mod jsondb;
