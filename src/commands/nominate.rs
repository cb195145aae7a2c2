use serenity::builder::CreateApplicationCommand;

pub const NAME: &str = "nominate";

pub fn create_nominate_command(command: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    command
        .name(NAME)
        .description("Nominate people, one per line. Submitting again replaces your earlier nominations")
}
