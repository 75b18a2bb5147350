//! Spoken prompt rendering
//!
//! The dialogue engine refers to every utterance by [`MessageKey`] and never
//! holds literal text. A [`Renderer`] turns a key and its positional
//! arguments into speech; [`EnglishCatalog`] is the built-in en-US table.

/// Every message the skill can speak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    SkillName,
    Welcome,
    HowCanIHelp,
    HelpMe,
    Stop,
    NoUnderstand,

    MainMenu,
    MainMenuReprompt,
    HelpMainMenu,

    LinkAccount,

    NoSets,
    NoFavoriteSets,
    NoClassSets,
    NoClasses,

    OneSet,
    OneFavoriteSet,
    OneClassSet,
    OneClass,
    LastSet,

    SetLabel,
    ClassLabel,

    UseSet,
    UseSetReprompt,
    HelpUseSet,
    UseClass,
    UseClassReprompt,
    HelpUseClass,

    ChooseSet,
    ChooseSetReprompt,
    SayNextMoreSets,
    HelpChooseSet,
    ChooseClass,
    ChooseClassReprompt,
    SayNextMoreClasses,
    HelpChooseClass,

    SetNameIs,
    ClassNameIs,
    ChosenSet,
    SetHasTerms,
    EmptySet,

    SetMenu,
    SetMenuReprompt,
    HelpSetMenu,
    MarkFavorite,
    UnmarkFavorite,
    MarkedFavorite,
    UnmarkedFavorite,

    ReviewMenu,
    ReviewMenuReprompt,
    HelpReviewMenu,
    ReviewByTerm,
    ReviewByDefinition,
    ReviewNext,
    ReviewReprompt,
    HelpReviewing,
    ReviewComplete,

    QuizMenu,
    QuizMenuReprompt,
    HelpQuizMenu,
    QuizNeedsTwoTerms,
    TrueFalseQuestion,
    TrueFalseReprompt,
    HelpTrueFalse,
    MultipleChoiceQuestion,
    ChoiceLabel,
    MultipleChoiceReprompt,
    HelpMultipleChoice,
    Correct,
    IncorrectTrueFalse,
    IncorrectChoice,
    QuizComplete,
    GreatWork,
    GoodJob,

    Unexpected,
    ServiceError,
}

/// Renders a message key with positional arguments into speech
pub trait Renderer: Send + Sync {
    fn render(&self, key: MessageKey, args: &[&str]) -> String;

    /// Render a message that takes no arguments
    fn text(&self, key: MessageKey) -> String {
        self.render(key, &[])
    }
}

/// Built-in en-US message table
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishCatalog;

impl EnglishCatalog {
    #[allow(clippy::too_many_lines)]
    fn template(key: MessageKey) -> &'static str {
        use MessageKey as K;
        match key {
            K::SkillName => "Quizlexa",
            K::Welcome => "Welcome to %s. ",
            K::HowCanIHelp => "How can I help you? ",
            K::HelpMe => "For instructions on what you can say, please say help me. ",
            K::Stop => "Goodbye! ",
            K::NoUnderstand => "Sorry, I don't quite understand what you mean. ",

            K::MainMenu => "You can ask me to find a favorite set, find a set, or find a class. ",
            K::MainMenuReprompt => "You can ask me to find a favorite set, find a set, or find a class, or say help me. ",
            K::HelpMainMenu => "Say find a favorite set to find one of your favorite sets. Say find a set to find one of your sets. Say find a class to find one of your classes. Say repeat to hear the commands again or you can say exit...Now, %s",

            K::LinkAccount => "Your Quizlet account is not linked. Please use the Alexa app to link your account. ",

            K::NoSets => "You do not have any sets yet. Go to Quizlet dot com and add some sets to use. ",
            K::NoFavoriteSets => "You do not have any favorite sets yet. ",
            K::NoClassSets => "You do not have any sets in this class yet. ",
            K::NoClasses => "You have not set up any classes yet. ",

            K::OneSet => "You have one set. ",
            K::OneFavoriteSet => "You have one favorite set. ",
            K::OneClassSet => "You have one set in this class. ",
            K::OneClass => "You have one class. ",
            K::LastSet => "The last Quizlet set you used is named %s. ",

            K::SetLabel => "Set ",
            K::ClassLabel => "Class ",

            K::UseSet => "Do you want to use this set? ",
            K::UseSetReprompt => "Say yes to use the set. Say no to find new sets or classes or say help me. ",
            K::HelpUseSet => "Say yes to use the set. Say no to find new sets or classes. Say repeat to hear the set name again or you can say exit...Now, %s",
            K::UseClass => "Do you want to use this class? ",
            K::UseClassReprompt => "Say yes to use the class. Say no to find new sets or classes or say help me. ",
            K::HelpUseClass => "Say yes to use the class. Say no to find new sets or classes. Say repeat to hear the class name again or you can say exit...Now, %s",

            K::ChooseSet => "Please choose from the following sets. ",
            K::ChooseSetReprompt => "Say the number of the set you want. %s or say help me. ",
            K::SayNextMoreSets => "Say next for more sets. ",
            K::HelpChooseSet => "Say the number of the set you want. %s Say repeat to hear the choices again. Say start over to find new sets or classes or you can say exit...Now, %s",
            K::ChooseClass => "Please choose from the following classes. ",
            K::ChooseClassReprompt => "Say the number of the class you want. %s or say help me. ",
            K::SayNextMoreClasses => "Say next for more classes. ",
            K::HelpChooseClass => "Say the number of the class you want. %s Say repeat to hear the choices again. Say start over to find new sets or classes or you can say exit...Now, %s",

            K::SetNameIs => "The Quizlet set name is %s. ",
            K::ClassNameIs => "The class name is %s. ",
            K::ChosenSet => "You have chosen the set named %s. ",
            K::SetHasTerms => "This set has %s terms. ",
            K::EmptySet => "The set named %s does not have any terms yet. ",

            K::SetMenu => "You can ask me to review the set, quiz me, or %s. ",
            K::SetMenuReprompt => "You can ask me to review the set, quiz me, %s, or say help me. ",
            K::HelpSetMenu => "Say review the set to review terms and definitions. Say quiz me to take a quiz. Say toggle favorite to %s. Say repeat to hear the commands again. Say start over to find new sets or classes or you can say exit...Now, %s",
            K::MarkFavorite => "mark the set as a favorite",
            K::UnmarkFavorite => "unmark the set as a favorite",
            K::MarkedFavorite => "Great! I have marked this set as a favorite. ",
            K::UnmarkedFavorite => "I have unmarked this set as a favorite. ",

            K::ReviewMenu => "You can ask me to review by term or review by definition. ",
            K::ReviewMenuReprompt => "You can ask me to review by term, review by definition, or say help me. ",
            K::HelpReviewMenu => "Say review by term to review the set starting with the term. Say review by definition to review the set starting with the definition. Say repeat to hear the commands again. Say start over to do other things with this set or you can say exit...Now, %s",
            K::ReviewByTerm => "Term %s: %s <break time=\"2s\"/> The definition is: %s <break time=\"2s\"/>",
            K::ReviewByDefinition => "Definition %s: %s <break time=\"2s\"/> The term is: %s <break time=\"2s\"/>",
            K::ReviewNext => "Say next to continue. ",
            K::ReviewReprompt => "Say next to continue, repeat to hear it again, or say help me. ",
            K::HelpReviewing => "Say next to hear the next term. Say repeat to hear this term again. Say start over to do other things with this set or you can say exit...Now, %s",
            K::ReviewComplete => "You have reviewed all of the terms in this set. ",

            K::QuizMenu => "You can ask me for a terms quiz or a definitions quiz. ",
            K::QuizMenuReprompt => "You can ask me for a terms quiz, a definitions quiz, or say help me. ",
            K::HelpQuizMenu => "Say terms quiz to answer true or false questions about each term. Say definitions quiz to pick the term that matches each definition. Say repeat to hear the commands again. Say start over to do other things with this set or you can say exit...Now, %s",
            K::QuizNeedsTwoTerms => "A terms quiz needs a set with at least two terms. ",
            K::TrueFalseQuestion => "Question %s. Does %s mean %s? ",
            K::TrueFalseReprompt => "Say yes or no, or say help me. ",
            K::HelpTrueFalse => "Say yes if the definition matches the term, or no if it does not. Say repeat to hear the question again. Say start over to stop the quiz or you can say exit...Now, %s",
            K::MultipleChoiceQuestion => "Question %s. Which term matches the definition %s? <break time=\"1s\"/>",
            K::ChoiceLabel => "Term ",
            K::MultipleChoiceReprompt => "Say the number of the term that matches the definition, or say help me. ",
            K::HelpMultipleChoice => "Say the number of the term that matches the definition. Say repeat to hear the question again. Say start over to stop the quiz or you can say exit...Now, %s",
            K::Correct => "Correct! ",
            K::IncorrectTrueFalse => "Sorry, that is incorrect. %s means %s. ",
            K::IncorrectChoice => "Sorry, the correct answer is %s. ",
            K::QuizComplete => "You got %s out of %s questions right. ",
            K::GreatWork => "Great work! ",
            K::GoodJob => "Good job! ",

            K::Unexpected => "An unexpected error has occurred. Please try again later! ",
            K::ServiceError => "There was an error communicating with Quizlet. Please try again later! ",
        }
    }
}

impl Renderer for EnglishCatalog {
    fn render(&self, key: MessageKey, args: &[&str]) -> String {
        substitute(Self::template(key), args)
    }
}

/// Replace each `%s` in order with the next argument; missing arguments render empty
fn substitute(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut pieces = template.split("%s");
    if let Some(first) = pieces.next() {
        out.push_str(first);
    }
    for piece in pieces {
        if let Some(arg) = args.next() {
            out.push_str(arg);
        }
        out.push_str(piece);
    }
    out
}

/// Escape user data (titles, terms, definitions) before it goes into SSML
pub fn escape_ssml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
